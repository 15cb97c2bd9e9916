use tokio::time::Duration;

use crate::config::EngineConfig;

use super::ai::{AiClient, AiError};
use super::{Action, DecisionRequest, DecisionResult, DecisionSource};

/// Arbiter phases within one cycle
///
/// Every cycle starts in AwaitingExternal and moves to Fallback only when
/// the external path fails; the state is never carried across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterState {
    AwaitingExternal,
    Fallback,
}

/// Produces exactly one DecisionResult per cycle
///
/// Prefers the external AI service within a bounded timeout and otherwise
/// derives the action directly from the combined signal, so a cycle can
/// degrade in quality but never in availability.
pub struct DecisionArbiter {
    ai: Option<AiClient>,
    buy_threshold: f64,
    sell_threshold: f64,
    timeout: Duration,
}

impl DecisionArbiter {
    pub fn new(config: &EngineConfig, ai: Option<AiClient>) -> Self {
        Self {
            ai,
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
            timeout: Duration::from_secs(config.ai_timeout_secs),
        }
    }

    pub async fn decide(&self, request: &DecisionRequest) -> DecisionResult {
        if let Some(ai) = &self.ai {
            tracing::debug!(
                symbol = %request.symbol,
                state = ?ArbiterState::AwaitingExternal,
                "requesting external decision"
            );

            match tokio::time::timeout(self.timeout, ai.decide(request)).await {
                Ok(Ok(decision)) => {
                    let size_fraction =
                        decision.size_fraction.clamp(0.0, request.size.max_fraction);
                    if size_fraction < decision.size_fraction {
                        tracing::warn!(
                            symbol = %request.symbol,
                            requested = decision.size_fraction,
                            clipped = size_fraction,
                            "external decision size clipped to position cap"
                        );
                    }

                    return DecisionResult {
                        action: decision.action,
                        size_fraction,
                        rationale: decision.rationale,
                        source: DecisionSource::AiService,
                    };
                }
                Ok(Err(error)) => {
                    tracing::warn!(
                        symbol = %request.symbol,
                        %error,
                        state = ?ArbiterState::Fallback,
                        "external decision failed, using quant fallback"
                    );
                    return self.fallback(request, &error.to_string());
                }
                Err(_) => {
                    let error = AiError::Timeout(self.timeout.as_secs());
                    tracing::warn!(
                        symbol = %request.symbol,
                        %error,
                        state = ?ArbiterState::Fallback,
                        "external decision timed out, using quant fallback"
                    );
                    return self.fallback(request, &error.to_string());
                }
            }
        }

        self.fallback(request, "no external decision service configured")
    }

    /// Pure quantitative path: thresholds on the combined signal, size
    /// recommendation used verbatim
    fn fallback(&self, request: &DecisionRequest, reason: &str) -> DecisionResult {
        let value = request.combined.value;
        let action = if value > self.buy_threshold {
            Action::Buy
        } else if value < self.sell_threshold {
            Action::Sell
        } else {
            Action::Hold
        };

        DecisionResult {
            action,
            size_fraction: request.size.fraction,
            rationale: format!(
                "quant fallback: combined signal {:+.3} against thresholds [{:+.2}, {:+.2}] in {} regime ({})",
                value, self.sell_threshold, self.buy_threshold, request.regime.regime, reason
            ),
            source: DecisionSource::QuantFallback,
        }
    }
}
