use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::regime::{MarketRegime, RegimeReading};

use super::SignalSet;

/// Everything that can carry weight in the blend: the four base signals
/// plus the regime-derived directional bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendComponent {
    Trend,
    Momentum,
    RegimeBias,
    Volatility,
    MeanReversion,
}

/// One weight row; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub trend: f64,
    pub momentum: f64,
    pub regime_bias: f64,
    pub volatility: f64,
    pub mean_reversion: f64,
}

impl BlendWeights {
    pub fn sum(&self) -> f64 {
        self.trend + self.momentum + self.regime_bias + self.volatility + self.mean_reversion
    }

    fn min(&self) -> f64 {
        self.trend
            .min(self.momentum)
            .min(self.regime_bias)
            .min(self.volatility)
            .min(self.mean_reversion)
    }
}

/// Blend weights per regime
///
/// Trending favors trend/momentum and drops mean reversion entirely;
/// Volatile leans on mean reversion and the regime bias with no trend
/// weight; Ranging spreads the regime-bias weight evenly across the four
/// base signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeWeights {
    pub trending: BlendWeights,
    pub ranging: BlendWeights,
    pub volatile: BlendWeights,
}

impl Default for RegimeWeights {
    fn default() -> Self {
        Self {
            trending: BlendWeights {
                trend: 0.35,
                momentum: 0.25,
                regime_bias: 0.20,
                volatility: 0.20,
                mean_reversion: 0.0,
            },
            ranging: BlendWeights {
                trend: 0.25,
                momentum: 0.25,
                regime_bias: 0.0,
                volatility: 0.25,
                mean_reversion: 0.25,
            },
            volatile: BlendWeights {
                trend: 0.0,
                momentum: 0.20,
                regime_bias: 0.25,
                volatility: 0.25,
                mean_reversion: 0.30,
            },
        }
    }
}

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl RegimeWeights {
    pub fn row(&self, regime: MarketRegime) -> &BlendWeights {
        match regime {
            MarketRegime::Trending => &self.trending,
            MarketRegime::Ranging => &self.ranging,
            MarketRegime::Volatile => &self.volatile,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, row) in [
            ("trending", &self.trending),
            ("ranging", &self.ranging),
            ("volatile", &self.volatile),
        ] {
            if row.min() < 0.0 {
                return Err(ConfigError::NegativeWeight { regime: name });
            }
            let sum = row.sum();
            if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
                return Err(ConfigError::WeightSum { regime: name, sum });
            }
        }

        Ok(())
    }
}

/// One component's share of the blend, kept for audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalContribution {
    pub component: BlendComponent,
    /// Effective weight after zero-confidence redistribution
    pub weight: f64,
    pub value: f64,
    pub confidence: f64,
}

/// Regime-weighted blend of the four signals plus the regime bias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSignal {
    /// Blended directional estimate in [-1, 1]
    pub value: f64,
    /// Weighted confidence in [0, 1]
    pub confidence: f64,
    pub regime: MarketRegime,
    pub contributions: Vec<SignalContribution>,
}

/// Applies the per-regime weight table
#[derive(Debug, Clone)]
pub struct SignalCombiner {
    weights: RegimeWeights,
}

impl SignalCombiner {
    pub fn new(weights: RegimeWeights) -> Self {
        Self { weights }
    }

    pub fn combine(&self, signals: &SignalSet, reading: &RegimeReading) -> CombinedSignal {
        let row = self.weights.row(reading.regime);
        let (bias_value, bias_confidence) = regime_bias(signals, reading.regime);

        let mut entries = [
            (
                BlendComponent::Trend,
                row.trend,
                signals.trend.value,
                signals.trend.confidence,
            ),
            (
                BlendComponent::Momentum,
                row.momentum,
                signals.momentum.value,
                signals.momentum.confidence,
            ),
            (
                BlendComponent::RegimeBias,
                row.regime_bias,
                bias_value,
                bias_confidence,
            ),
            (
                BlendComponent::Volatility,
                row.volatility,
                signals.volatility.value,
                signals.volatility.confidence,
            ),
            (
                BlendComponent::MeanReversion,
                row.mean_reversion,
                signals.mean_reversion.value,
                signals.mean_reversion.confidence,
            ),
        ];

        // Redistribute the weight of zero-confidence components across the
        // rest instead of silently zeroing part of the blend
        let live_weight: f64 = entries
            .iter()
            .filter(|(_, _, _, confidence)| *confidence > 0.0)
            .map(|(_, weight, _, _)| weight)
            .sum();

        if live_weight <= 0.0 {
            let contributions = entries
                .iter()
                .map(|&(component, _, value, confidence)| SignalContribution {
                    component,
                    weight: 0.0,
                    value,
                    confidence,
                })
                .collect();

            return CombinedSignal {
                value: 0.0,
                confidence: 0.0,
                regime: reading.regime,
                contributions,
            };
        }

        for entry in &mut entries {
            entry.1 = if entry.3 > 0.0 { entry.1 / live_weight } else { 0.0 };
        }

        let value: f64 = entries.iter().map(|(_, w, v, _)| w * v).sum();
        let confidence: f64 = entries.iter().map(|(_, w, _, c)| w * c).sum();

        let contributions = entries
            .iter()
            .map(|&(component, weight, value, confidence)| SignalContribution {
                component,
                weight,
                value,
                confidence,
            })
            .collect();

        CombinedSignal {
            value: value.clamp(-1.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
            regime: reading.regime,
            contributions,
        }
    }
}

/// Directional bias implied by the regime itself, derived from the four
/// base signals with regime-dependent emphasis
fn regime_bias(signals: &SignalSet, regime: MarketRegime) -> (f64, f64) {
    let (trend_emphasis, reversion_emphasis) = match regime {
        MarketRegime::Trending => (1.2, 0.8),
        MarketRegime::Volatile => (0.8, 0.6),
        MarketRegime::Ranging => (0.8, 1.2),
    };

    let value = (trend_emphasis * signals.trend.value
        + reversion_emphasis * signals.mean_reversion.value
        + signals.momentum.value
        + signals.volatility.value)
        / 4.0;

    let confidence = (signals.trend.confidence
        + signals.mean_reversion.confidence
        + signals.momentum.confidence
        + signals.volatility.confidence)
        / 4.0;

    (value.clamp(-1.0, 1.0), confidence)
}
