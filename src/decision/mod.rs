// Decision arbitration: external AI service first, quantitative fallback
// always available
pub mod ai;
pub mod arbiter;

pub use ai::{AiClient, AiError};
pub use arbiter::{ArbiterState, DecisionArbiter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::indicators::IndicatorSnapshot;
use crate::regime::RegimeReading;
use crate::risk::PositionSizeRecommendation;
use crate::signals::CombinedSignal;

/// Final trading action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

/// Which path produced the decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionSource {
    AiService,
    QuantFallback,
}

/// The full quantitative picture handed to the external decision service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub cycle_id: Uuid,
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    pub regime: RegimeReading,
    pub combined: CombinedSignal,
    pub size: PositionSizeRecommendation,
}

/// One cycle's final decision; every cycle produces exactly one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub action: Action,
    /// Capital fraction to deploy, within the per-position cap
    pub size_fraction: f64,
    pub rationale: String,
    pub source: DecisionSource,
}
