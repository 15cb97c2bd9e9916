// Market regime classification
pub mod classifier;

pub use classifier::RegimeClassifier;

use serde::{Deserialize, Serialize};

/// Discrete market state driving signal weights and risk multipliers
///
/// A closed set so that every weight-table lookup is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    /// Persistent directional movement
    Trending,
    /// Range-bound or mean-reverting movement
    Ranging,
    /// Elevated volatility overriding the directional read
    Volatile,
}

impl std::fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRegime::Trending => write!(f, "trending"),
            MarketRegime::Ranging => write!(f, "ranging"),
            MarketRegime::Volatile => write!(f, "volatile"),
        }
    }
}

/// One cycle's regime classification
///
/// Derived fresh from the current window every cycle; never carried over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeReading {
    pub regime: MarketRegime,
    /// Classification confidence in [0, 1]
    pub confidence: f64,
    /// The Hurst exponent that drove the label, when it was computable
    pub hurst: Option<f64>,
}
