// Per-cycle evaluation pipeline:
// indicators -> regime -> signals -> blend -> size -> arbiter

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{ConfigError, EngineConfig};
use crate::decision::{AiClient, DecisionArbiter, DecisionRequest, DecisionResult};
use crate::indicators::IndicatorSnapshot;
use crate::models::PriceWindow;
use crate::regime::{RegimeClassifier, RegimeReading};
use crate::risk::{PositionSizeRecommendation, PositionSizer, TradeStats};
use crate::signals::{CombinedSignal, SignalCombiner, SignalSet};

/// The deterministic part of one cycle, before the arbiter
///
/// Pure function of the window: identical windows replay to identical
/// analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleAnalysis {
    pub snapshot: IndicatorSnapshot,
    pub regime: RegimeReading,
    pub signals: SignalSet,
    pub combined: CombinedSignal,
    pub size: PositionSizeRecommendation,
}

/// Full audit record of one evaluation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle_id: Uuid,
    pub symbol: String,
    pub analysis: CycleAnalysis,
    pub decision: DecisionResult,
}

/// One instrument's decision engine
///
/// Owns no mutable state across cycles; each evaluation derives everything
/// fresh from the window it is handed. Engines for distinct instruments
/// can therefore run fully in parallel.
pub struct Engine {
    classifier: RegimeClassifier,
    combiner: SignalCombiner,
    sizer: PositionSizer,
    arbiter: DecisionArbiter,
}

impl Engine {
    /// Build an engine, failing fast on invalid configuration
    pub fn new(config: EngineConfig, ai: Option<AiClient>) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            classifier: RegimeClassifier::new(&config),
            combiner: SignalCombiner::new(config.weights),
            sizer: PositionSizer::new(&config),
            arbiter: DecisionArbiter::new(&config, ai),
        })
    }

    /// Run the quantitative pipeline for one window
    pub fn analyze(&self, window: &PriceWindow, stats: Option<&TradeStats>) -> CycleAnalysis {
        let snapshot = IndicatorSnapshot::compute(window);
        let regime = self.classifier.classify(&snapshot);
        let signals = SignalSet::generate(&snapshot);
        let combined = self.combiner.combine(&signals, &regime);
        let size = self.sizer.recommend(&combined, &regime, &snapshot, stats);

        tracing::debug!(
            symbol = window.symbol(),
            bars = window.len(),
            regime = %regime.regime,
            regime_confidence = regime.confidence,
            hurst = ?regime.hurst,
            combined = combined.value,
            combined_confidence = combined.confidence,
            size = size.fraction,
            "cycle analysis"
        );

        CycleAnalysis {
            snapshot,
            regime,
            signals,
            combined,
            size,
        }
    }

    /// Run one full evaluation cycle, always yielding a decision
    pub async fn evaluate(
        &self,
        window: &PriceWindow,
        stats: Option<&TradeStats>,
    ) -> CycleRecord {
        let analysis = self.analyze(window, stats);

        let request = DecisionRequest {
            cycle_id: Uuid::new_v4(),
            symbol: window.symbol().to_string(),
            snapshot: analysis.snapshot.clone(),
            regime: analysis.regime.clone(),
            combined: analysis.combined.clone(),
            size: analysis.size.clone(),
        };

        let decision = self.arbiter.decide(&request).await;

        let record = CycleRecord {
            cycle_id: request.cycle_id,
            symbol: request.symbol,
            analysis,
            decision,
        };

        tracing::info!(
            symbol = %record.symbol,
            cycle = %record.cycle_id,
            action = %record.decision.action,
            size = record.decision.size_fraction,
            source = ?record.decision.source,
            regime = %record.analysis.regime.regime,
            "cycle decision"
        );

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Action, DecisionSource};
    use crate::regime::MarketRegime;
    use crate::synthetic::{MarketScenario, SyntheticDataGenerator};

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), None).unwrap()
    }

    fn window(scenario: MarketScenario, n: usize) -> PriceWindow {
        let bars = SyntheticDataGenerator::new(21).generate(scenario, n, 60);
        PriceWindow::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = EngineConfig {
            buy_threshold: -1.0,
            ..EngineConfig::default()
        };
        assert!(Engine::new(config, None).is_err());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let engine = engine();
        let window = window(MarketScenario::RandomWalk, 150);

        let first = engine.analyze(&window, None);
        let second = engine.analyze(&window, None);

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_window_holds_with_zero_size() {
        let engine = engine();
        let window = PriceWindow::new("TEST", vec![]).unwrap();

        let record = engine.evaluate(&window, None).await;

        assert_eq!(record.analysis.regime.regime, MarketRegime::Ranging);
        assert!(record.analysis.regime.confidence <= 0.5);
        assert_eq!(record.analysis.signals.trend.value, 0.0);
        assert_eq!(record.analysis.signals.trend.confidence, 0.0);
        assert_eq!(record.analysis.signals.momentum.confidence, 0.0);
        assert_eq!(record.analysis.combined.value, 0.0);
        assert_eq!(record.decision.action, Action::Hold);
        assert_eq!(record.decision.size_fraction, 0.0);
        assert_eq!(record.decision.source, DecisionSource::QuantFallback);
    }

    #[tokio::test]
    async fn test_single_bar_window_holds() {
        let engine = engine();
        let bars = SyntheticDataGenerator::new(5).generate(MarketScenario::Sideways, 1, 60);
        let window = PriceWindow::new("TEST", bars).unwrap();

        let record = engine.evaluate(&window, None).await;

        assert_eq!(record.analysis.regime.regime, MarketRegime::Ranging);
        assert!(record.analysis.regime.confidence <= 0.5);
        assert_eq!(record.decision.action, Action::Hold);
        assert_eq!(record.decision.size_fraction, 0.0);
    }

    #[tokio::test]
    async fn test_short_window_degrades_without_error() {
        let engine = engine();
        let window = window(MarketScenario::Sideways, 5);

        let record = engine.evaluate(&window, None).await;

        // RSI(14) unavailable on 5 bars: mean reversion runs blind
        assert!(record.analysis.snapshot.rsi.is_none());
        assert!(record.analysis.signals.mean_reversion.confidence < 1.0);
        assert_eq!(record.decision.source, DecisionSource::QuantFallback);
    }

    #[tokio::test]
    async fn test_every_cycle_yields_exactly_one_decision() {
        let engine = engine();

        for scenario in [
            MarketScenario::RandomWalk,
            MarketScenario::Trending,
            MarketScenario::MeanReverting,
            MarketScenario::Volatile,
        ] {
            let window = window(scenario, 120);
            let record = engine.evaluate(&window, None).await;

            assert!((-1.0..=1.0).contains(&record.analysis.combined.value));
            assert!(record.decision.size_fraction >= 0.0);
            assert!(record.decision.size_fraction <= 0.10);
        }
    }
}
