// Directional signal generation and regime-weighted blending
pub mod combiner;
pub mod mean_reversion;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use combiner::{CombinedSignal, SignalCombiner};
pub use mean_reversion::mean_reversion_signal;
pub use momentum::momentum_signal;
pub use trend::trend_signal;
pub use volatility::volatility_signal;

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;

/// The four base signal families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Trend,
    MeanReversion,
    Momentum,
    Volatility,
}

/// One directional estimate
///
/// Value is bounded to [-1, 1] (negative bearish, positive bullish);
/// confidence in [0, 1] is the fraction of the generator's expected
/// indicators that were available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub value: f64,
    pub confidence: f64,
}

impl Signal {
    pub(crate) fn bounded(kind: SignalKind, value: f64, present: usize, expected: usize) -> Self {
        let value = if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 };
        let confidence = if expected == 0 {
            0.0
        } else {
            (present as f64 / expected as f64).clamp(0.0, 1.0)
        };

        Self {
            kind,
            value,
            confidence,
        }
    }
}

/// All four base signals for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    pub trend: Signal,
    pub mean_reversion: Signal,
    pub momentum: Signal,
    pub volatility: Signal,
}

impl SignalSet {
    /// Run every generator against the snapshot
    ///
    /// Generators are pure functions of the snapshot, so identical windows
    /// replay to identical signals.
    pub fn generate(snapshot: &IndicatorSnapshot) -> Self {
        Self {
            trend: trend_signal(snapshot),
            mean_reversion: mean_reversion_signal(snapshot),
            momentum: momentum_signal(snapshot),
            volatility: volatility_signal(snapshot),
        }
    }
}
