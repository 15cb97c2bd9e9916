use crate::config::EngineConfig;
use crate::indicators::IndicatorSnapshot;

use super::{MarketRegime, RegimeReading};

/// Classifies the market regime from the Hurst exponent with a volatility
/// override
///
/// - Volatility ratio above the configured multiple: Volatile, regardless
///   of the Hurst read
/// - H above the trending threshold: Trending
/// - H below the mean-reverting threshold: mean reverting, folded into
///   Ranging (the elevated-volatility case is already captured above)
/// - otherwise: Ranging
///
/// When the Hurst exponent cannot be computed the classifier falls back to
/// the volatility ratio and Bollinger width alone and caps confidence at
/// 0.5.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    volatility_override_ratio: f64,
    hurst_trending_threshold: f64,
    hurst_mean_reverting_threshold: f64,
}

/// Relative Bollinger width treated as wide in the degenerate fallback
const WIDE_BAND_RATIO: f64 = 0.10;

impl RegimeClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            volatility_override_ratio: config.volatility_override_ratio,
            hurst_trending_threshold: config.hurst_trending_threshold,
            hurst_mean_reverting_threshold: config.hurst_mean_reverting_threshold,
        }
    }

    pub fn classify(&self, snapshot: &IndicatorSnapshot) -> RegimeReading {
        match snapshot.hurst {
            Some(hurst) => self.classify_with_hurst(hurst, snapshot),
            None => self.classify_degenerate(snapshot),
        }
    }

    fn classify_with_hurst(&self, hurst: f64, snapshot: &IndicatorSnapshot) -> RegimeReading {
        let threshold = self.volatility_override_ratio;
        let vol_ratio = snapshot.volatility_ratio.unwrap_or(1.0);
        let hurst_term = ((hurst - 0.5).abs() * 2.0).clamp(0.0, 1.0);

        // Volatility override takes precedence over the Hurst label
        if vol_ratio > threshold {
            let vol_term = ((vol_ratio - threshold) / threshold).clamp(0.0, 1.0);
            return RegimeReading {
                regime: MarketRegime::Volatile,
                confidence: (0.5 + 0.4 * vol_term + 0.1 * hurst_term).clamp(0.0, 1.0),
                hurst: Some(hurst),
            };
        }

        let regime = if hurst > self.hurst_trending_threshold {
            MarketRegime::Trending
        } else {
            // Mean-reverting reads fold into Ranging
            MarketRegime::Ranging
        };

        // Distance below the override threshold supports the directional read
        let vol_margin = ((threshold - vol_ratio) / (threshold - 1.0)).clamp(0.0, 1.0);
        let confidence = (0.7 * hurst_term + 0.3 * vol_margin).clamp(0.0, 1.0);

        RegimeReading {
            regime,
            confidence,
            hurst: Some(hurst),
        }
    }

    /// Simplified rule for windows where the Hurst regression is undefined
    fn classify_degenerate(&self, snapshot: &IndicatorSnapshot) -> RegimeReading {
        let threshold = self.volatility_override_ratio;

        if let Some(ratio) = snapshot.volatility_ratio {
            if ratio > threshold {
                let margin = ((ratio - threshold) / threshold).clamp(0.0, 1.0);
                return RegimeReading {
                    regime: MarketRegime::Volatile,
                    confidence: (0.3 + 0.2 * margin).min(0.5),
                    hurst: None,
                };
            }

            let margin = ((threshold - ratio) / (threshold - 1.0)).clamp(0.0, 1.0);
            return RegimeReading {
                regime: MarketRegime::Ranging,
                confidence: (0.25 + 0.25 * margin).min(0.5),
                hurst: None,
            };
        }

        if let (Some(bands), Some(close)) = (snapshot.bollinger.as_ref(), snapshot.last_close) {
            if close > 0.0 && bands.width / close > WIDE_BAND_RATIO {
                return RegimeReading {
                    regime: MarketRegime::Volatile,
                    confidence: 0.4,
                    hurst: None,
                };
            }
            return RegimeReading {
                regime: MarketRegime::Ranging,
                confidence: 0.3,
                hurst: None,
            };
        }

        // Nothing to go on (empty or single-bar window)
        RegimeReading {
            regime: MarketRegime::Ranging,
            confidence: 0.2,
            hurst: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceWindow;
    use crate::synthetic::{MarketScenario, SyntheticDataGenerator};

    fn classifier() -> RegimeClassifier {
        RegimeClassifier::new(&EngineConfig::default())
    }

    fn snapshot_for(scenario: MarketScenario, n: usize) -> IndicatorSnapshot {
        let bars = SyntheticDataGenerator::new(11).generate(scenario, n, 60);
        IndicatorSnapshot::compute(&PriceWindow::new("TEST", bars).unwrap())
    }

    #[test]
    fn test_persistent_market_reads_trending() {
        let mut snapshot = snapshot_for(MarketScenario::Trending, 1500);
        // Pin volatility to quiet so the Hurst path decides
        snapshot.volatility_ratio = Some(1.0);
        let reading = classifier().classify(&snapshot);

        assert_eq!(reading.regime, MarketRegime::Trending);
        assert!(reading.hurst.unwrap() > 0.6);
        assert!(reading.confidence > 0.3);
    }

    #[test]
    fn test_volatility_override_beats_hurst() {
        let mut snapshot = snapshot_for(MarketScenario::Trending, 1500);
        snapshot.volatility_ratio = Some(2.5);

        let reading = classifier().classify(&snapshot);
        assert_eq!(reading.regime, MarketRegime::Volatile);
        assert!(reading.confidence >= 0.5);
    }

    #[test]
    fn test_mean_reverting_folds_into_ranging() {
        let mut snapshot = snapshot_for(MarketScenario::MeanReverting, 1500);
        snapshot.volatility_ratio = Some(1.0);
        let reading = classifier().classify(&snapshot);

        assert!(reading.hurst.unwrap() < 0.45);
        assert_eq!(reading.regime, MarketRegime::Ranging);
    }

    #[test]
    fn test_degenerate_window_caps_confidence() {
        // Too short for the Hurst regression
        let snapshot = snapshot_for(MarketScenario::Sideways, 10);
        let reading = classifier().classify(&snapshot);

        assert!(reading.hurst.is_none());
        assert!(reading.confidence <= 0.5);
    }

    #[test]
    fn test_empty_window_defaults_to_ranging() {
        let snapshot = IndicatorSnapshot::default();
        let reading = classifier().classify(&snapshot);

        assert_eq!(reading.regime, MarketRegime::Ranging);
        assert!(reading.confidence <= 0.5);
    }

    #[test]
    fn test_degenerate_volatility_spike_reads_volatile() {
        let mut snapshot = IndicatorSnapshot::default();
        snapshot.volatility_ratio = Some(2.0);

        let reading = classifier().classify(&snapshot);
        assert_eq!(reading.regime, MarketRegime::Volatile);
        assert!(reading.confidence <= 0.5);
    }
}
