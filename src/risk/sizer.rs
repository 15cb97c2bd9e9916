use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::indicators::IndicatorSnapshot;
use crate::regime::{MarketRegime, RegimeReading};
use crate::signals::CombinedSignal;

/// Trailing trade outcome statistics feeding the Kelly estimate
///
/// Passed in as an immutable snapshot by whoever keeps the ledger; when no
/// history exists yet, `estimate` derives conservative defaults from the
/// current indicator picture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    /// Win probability p
    pub win_rate: f64,
    /// Average win / average loss ratio b
    pub payoff_ratio: f64,
}

impl TradeStats {
    /// Indicator-based estimate for the no-history case
    ///
    /// Base win rate 0.55, nudged by RSI extremity, momentum strength,
    /// volatility and regime, bounded to [0.45, 0.65]. Payoff assumes a 2%
    /// average win against a 1.5% average loss.
    pub fn estimate(snapshot: &IndicatorSnapshot, regime: MarketRegime) -> Self {
        let mut win_rate: f64 = 0.55;

        if let Some(rsi) = snapshot.rsi {
            // Extremes revert more reliably than the neutral zone
            if (30.0..=70.0).contains(&rsi) {
                win_rate -= 0.05;
            } else {
                win_rate += 0.05;
            }
        }

        if let Some(roc) = snapshot.roc {
            if roc.abs() > 3.0 {
                win_rate += 0.03;
            }
        }

        if let Some(stddev) = snapshot.return_stddev {
            if stddev > 0.05 {
                win_rate -= 0.05;
            }
        }

        match regime {
            MarketRegime::Volatile => win_rate -= 0.05,
            MarketRegime::Trending => win_rate += 0.02,
            MarketRegime::Ranging => {}
        }

        Self {
            win_rate: win_rate.clamp(0.45, 0.65),
            payoff_ratio: 0.02 / 0.015,
        }
    }
}

/// Per-position capital allocation, with the caps the caller must respect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizeRecommendation {
    /// Recommended fraction of total capital, in [0, max_fraction]
    pub fraction: f64,
    /// Hard per-position cap the fraction was clamped to
    pub max_fraction: f64,
    /// Aggregate cap across open positions; enforcing it is the portfolio
    /// ledger's job, not this engine's
    pub portfolio_cap: f64,
}

/// Kelly-based position sizer
///
/// The raw Kelly fraction is tamed four ways: a fractional-Kelly
/// multiplier, scaling by the blended signal magnitude, an inverse
/// volatility adjustment, and a regime multiplier. The result is clamped
/// into [0, max_fraction] no matter what the inputs were.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    max_fraction: f64,
    portfolio_cap: f64,
    default_fraction: f64,
    kelly_multiplier: f64,
}

impl PositionSizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_fraction: config.max_position_fraction,
            portfolio_cap: config.portfolio_cap,
            default_fraction: config.kelly_default_fraction,
            kelly_multiplier: config.kelly_multiplier,
        }
    }

    pub fn recommend(
        &self,
        combined: &CombinedSignal,
        reading: &RegimeReading,
        snapshot: &IndicatorSnapshot,
        stats: Option<&TradeStats>,
    ) -> PositionSizeRecommendation {
        let estimated;
        let stats = match stats {
            Some(stats) => stats,
            None => {
                estimated = TradeStats::estimate(snapshot, reading.regime);
                &estimated
            }
        };

        let kelly = self.kelly_fraction(stats);

        let mut fraction = kelly * self.kelly_multiplier * combined.value.abs();

        // Larger recent volatility buys less
        if let Some(ratio) = snapshot.volatility_ratio {
            if ratio > 1.0 {
                fraction /= ratio;
            }
        }

        fraction *= match reading.regime {
            MarketRegime::Volatile => 0.7,
            MarketRegime::Trending => 1.2,
            MarketRegime::Ranging => 1.0,
        };

        if !fraction.is_finite() {
            fraction = 0.0;
        }

        PositionSizeRecommendation {
            fraction: fraction.clamp(0.0, self.max_fraction),
            max_fraction: self.max_fraction,
            portfolio_cap: self.portfolio_cap,
        }
    }

    /// f* = p - (1 - p) / b, defined only for p in (0, 1) and b > 0;
    /// anything else gets the conservative default
    fn kelly_fraction(&self, stats: &TradeStats) -> f64 {
        let p = stats.win_rate;
        let b = stats.payoff_ratio;

        if !(0.0 < p && p < 1.0) || b <= 0.0 || !b.is_finite() {
            return self.default_fraction;
        }

        let kelly = p - (1.0 - p) / b;
        if !kelly.is_finite() {
            return self.default_fraction;
        }

        kelly
    }
}
