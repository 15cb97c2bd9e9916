use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiConfig;

use super::{Action, DecisionRequest};

const MAX_TOKENS: u32 = 512;
const TEMPERATURE: f32 = 0.1; // Low temperature for consistent decisions

/// Failures on the external decision path; all of them are recovered by
/// the arbiter's fallback within the same cycle
#[derive(Debug, Error)]
pub enum AiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Service { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

#[derive(Debug, Deserialize)]
struct AiDecisionPayload {
    action: String,
    size_fraction: f64,
    rationale: String,
}

/// The AI service's answer, validated into typed form
#[derive(Debug, Clone)]
pub struct AiDecision {
    pub action: Action,
    pub size_fraction: f64,
    pub rationale: String,
}

/// Client for an OpenAI-compatible chat-completions decision service
///
/// One request per cycle, no internal retries; the arbiter bounds the call
/// with its own timeout and falls back on any error.
pub struct AiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        }
    }

    /// Ask the service for an action/size/rationale for this cycle
    pub async fn decide(&self, request: &DecisionRequest) -> Result<AiDecision, AiError> {
        let chat_request = ChatRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: "You are an expert quantitative trading assistant. Analyze the \
                              supplied market snapshot and respond with valid JSON only, no \
                              markdown formatting."
                        .to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_prompt(request),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&chat_request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::Malformed(format!("envelope: {}", e)))?;
        let content = chat_response
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| AiError::Malformed("empty choices".to_string()))?;

        let payload: AiDecisionPayload = serde_json::from_str(strip_code_fences(content))
            .map_err(|e| AiError::Malformed(format!("payload: {} (text: {})", e, content)))?;

        let action = match payload.action.to_lowercase().as_str() {
            "buy" | "long" => Action::Buy,
            "sell" | "short" => Action::Sell,
            "hold" | "neutral" => Action::Hold,
            other => {
                return Err(AiError::Malformed(format!("unknown action: {}", other)));
            }
        };

        if !payload.size_fraction.is_finite() || !(0.0..=1.0).contains(&payload.size_fraction) {
            return Err(AiError::Malformed(format!(
                "size_fraction out of range: {}",
                payload.size_fraction
            )));
        }

        Ok(AiDecision {
            action,
            size_fraction: payload.size_fraction,
            rationale: payload.rationale,
        })
    }
}

/// Strip markdown code blocks (```json ... ``` or ``` ... ```)
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    text.trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "n/a".to_string(),
    }
}

fn build_prompt(request: &DecisionRequest) -> String {
    let snapshot = &request.snapshot;

    let contributions: Vec<String> = request
        .combined
        .contributions
        .iter()
        .map(|c| {
            format!(
                "  - {:?}: value {:+.3}, weight {:.3}, confidence {:.2}",
                c.component, c.value, c.weight, c.confidence
            )
        })
        .collect();

    format!(
        r#"Decide the next trading action for {symbol}.

## Quantitative assessment
- Market regime: {regime} (confidence {regime_conf:.2}, Hurst {hurst})
- Combined signal: {combined:+.3} (confidence {combined_conf:.2}; positive = bullish)
- Signal breakdown:
{contributions}
- Recommended position size: {size:.4} of capital (hard cap {cap:.2})

## Indicators
- Close: {close}
- RSI(14): {rsi}
- MACD histogram: {macd_hist}
- CCI(20): {cci}
- ROC(10): {roc}%
- ATR(14): {atr}
- Bollinger position: {bb_pos}
- Volume vs average: {volume_ratio}
- Return skew: {skew}

Respond ONLY with valid JSON (no markdown, no code blocks):

{{
  "action": "buy|sell|hold",
  "size_fraction": 0.05,
  "rationale": "Brief explanation (1-2 sentences)"
}}

size_fraction must not exceed {cap:.2}."#,
        symbol = request.symbol,
        regime = request.regime.regime,
        regime_conf = request.regime.confidence,
        hurst = fmt_opt(request.regime.hurst),
        combined = request.combined.value,
        combined_conf = request.combined.confidence,
        contributions = contributions.join("\n"),
        size = request.size.fraction,
        cap = request.size.max_fraction,
        close = fmt_opt(snapshot.last_close),
        rsi = fmt_opt(snapshot.rsi),
        macd_hist = fmt_opt(snapshot.macd.map(|m| m.histogram)),
        cci = fmt_opt(snapshot.cci),
        roc = fmt_opt(snapshot.roc),
        atr = fmt_opt(snapshot.atr),
        bb_pos = fmt_opt(snapshot.bollinger_position),
        volume_ratio = fmt_opt(snapshot.volume_sma_ratio),
        skew = fmt_opt(snapshot.skewness),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::indicators::IndicatorSnapshot;
    use crate::regime::{MarketRegime, RegimeReading};
    use crate::risk::PositionSizeRecommendation;
    use crate::signals::CombinedSignal;
    use uuid::Uuid;

    fn test_request() -> DecisionRequest {
        DecisionRequest {
            cycle_id: Uuid::new_v4(),
            symbol: "SOL".to_string(),
            snapshot: IndicatorSnapshot::default(),
            regime: RegimeReading {
                regime: MarketRegime::Ranging,
                confidence: 0.6,
                hurst: Some(0.5),
            },
            combined: CombinedSignal {
                value: 0.25,
                confidence: 0.7,
                regime: MarketRegime::Ranging,
                contributions: vec![],
            },
            size: PositionSizeRecommendation {
                fraction: 0.05,
                max_fraction: 0.10,
                portfolio_cap: 0.25,
            },
        }
    }

    fn client_for(url: &str) -> AiClient {
        AiClient::new(AiConfig {
            api_key: "test-key".to_string(),
            base_url: url.to_string(),
            model: "test-model".to_string(),
        })
    }

    fn envelope(inner: &str) -> String {
        serde_json::json!({
            "choices": [{"message": {"content": inner}}]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_decide_parses_valid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(envelope(
                r#"{"action": "buy", "size_fraction": 0.04, "rationale": "momentum intact"}"#,
            ))
            .create_async()
            .await;

        let decision = client_for(&server.url()).decide(&test_request()).await.unwrap();
        assert_eq!(decision.action, Action::Buy);
        assert!((decision.size_fraction - 0.04).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_decide_strips_code_fences() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(envelope(
                "```json\n{\"action\": \"sell\", \"size_fraction\": 0.02, \"rationale\": \"overbought\"}\n```",
            ))
            .create_async()
            .await;

        let decision = client_for(&server.url()).decide(&test_request()).await.unwrap();
        assert_eq!(decision.action, Action::Sell);
    }

    #[tokio::test]
    async fn test_decide_rejects_unknown_action() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(envelope(
                r#"{"action": "yolo", "size_fraction": 0.04, "rationale": "?"}"#,
            ))
            .create_async()
            .await;

        let result = client_for(&server.url()).decide(&test_request()).await;
        assert!(matches!(result, Err(AiError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_decide_rejects_out_of_range_size() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(envelope(
                r#"{"action": "buy", "size_fraction": 1.5, "rationale": "all in"}"#,
            ))
            .create_async()
            .await;

        let result = client_for(&server.url()).decide(&test_request()).await;
        assert!(matches!(result, Err(AiError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_decide_surfaces_service_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let result = client_for(&server.url()).decide(&test_request()).await;
        assert!(matches!(result, Err(AiError::Service { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_decide_surfaces_transport_errors() {
        // Nothing listens on this port
        let result = client_for("http://127.0.0.1:9").decide(&test_request()).await;
        assert!(matches!(result, Err(AiError::Transport(_))));
    }

    #[test]
    fn test_strip_code_fences_passthrough() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
