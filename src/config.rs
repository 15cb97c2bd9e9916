use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::signals::combiner::RegimeWeights;

/// Configuration problems are fatal at startup, never at per-cycle runtime
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{regime} weight row sums to {sum}, expected 1.0")]
    WeightSum { regime: &'static str, sum: f64 },

    #[error("{regime} weight row contains a negative weight")]
    NegativeWeight { regime: &'static str },

    #[error("invalid cap: {0}")]
    InvalidCap(String),

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Tunable knobs for the decision engine
///
/// Defaults mirror the reference strategy; `validate` must pass before an
/// engine is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Per-regime blend weights for the signal combiner
    pub weights: RegimeWeights,
    /// Volatility-ratio multiple that forces the Volatile regime
    pub volatility_override_ratio: f64,
    /// Hurst exponent above which the market reads as trending
    pub hurst_trending_threshold: f64,
    /// Hurst exponent below which the market reads as mean reverting
    pub hurst_mean_reverting_threshold: f64,
    /// Combined-signal value above which the quant fallback buys
    pub buy_threshold: f64,
    /// Combined-signal value below which the quant fallback sells
    pub sell_threshold: f64,
    /// Hard per-position cap on the recommended capital fraction
    pub max_position_fraction: f64,
    /// Aggregate cap across open positions, enforced by the caller
    pub portfolio_cap: f64,
    /// Capital fraction used when Kelly inputs are unusable
    pub kelly_default_fraction: f64,
    /// Fraction of the raw Kelly estimate actually deployed
    pub kelly_multiplier: f64,
    /// Budget for one external AI decision call
    pub ai_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: RegimeWeights::default(),
            volatility_override_ratio: 1.5,
            hurst_trending_threshold: 0.6,
            hurst_mean_reverting_threshold: 0.4,
            buy_threshold: 0.2,
            sell_threshold: -0.2,
            max_position_fraction: 0.10, // Max 10% per position
            portfolio_cap: 0.25,         // Max 25% aggregate exposure
            kelly_default_fraction: 0.02,
            kelly_multiplier: 0.25, // Deploy 25% of raw Kelly
            ai_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if !(self.max_position_fraction > 0.0 && self.max_position_fraction <= 1.0) {
            return Err(ConfigError::InvalidCap(format!(
                "max_position_fraction {} outside (0, 1]",
                self.max_position_fraction
            )));
        }
        if !(self.portfolio_cap >= self.max_position_fraction && self.portfolio_cap <= 1.0) {
            return Err(ConfigError::InvalidCap(format!(
                "portfolio_cap {} must lie in [max_position_fraction, 1]",
                self.portfolio_cap
            )));
        }
        if !(self.kelly_default_fraction >= 0.0
            && self.kelly_default_fraction <= self.max_position_fraction)
        {
            return Err(ConfigError::InvalidCap(format!(
                "kelly_default_fraction {} outside [0, max_position_fraction]",
                self.kelly_default_fraction
            )));
        }
        if !(self.kelly_multiplier > 0.0 && self.kelly_multiplier <= 1.0) {
            return Err(ConfigError::InvalidCap(format!(
                "kelly_multiplier {} outside (0, 1]",
                self.kelly_multiplier
            )));
        }

        if self.buy_threshold <= 0.0 || self.sell_threshold >= 0.0 {
            return Err(ConfigError::InvalidThreshold(format!(
                "buy {} must be positive and sell {} negative",
                self.buy_threshold, self.sell_threshold
            )));
        }
        if !(0.0 < self.hurst_mean_reverting_threshold
            && self.hurst_mean_reverting_threshold < self.hurst_trending_threshold
            && self.hurst_trending_threshold < 1.0)
        {
            return Err(ConfigError::InvalidThreshold(format!(
                "hurst thresholds {} / {} must satisfy 0 < mean-reverting < trending < 1",
                self.hurst_mean_reverting_threshold, self.hurst_trending_threshold
            )));
        }
        if self.volatility_override_ratio <= 1.0 {
            return Err(ConfigError::InvalidThreshold(format!(
                "volatility_override_ratio {} must exceed 1.0",
                self.volatility_override_ratio
            )));
        }

        Ok(())
    }
}

/// Connection settings for the external AI decision service
///
/// Sourced from the environment: LLM_API_KEY (required), LLM_BASE_URL
/// (optional, any OpenAI-compatible endpoint), LLM_MODEL (optional).
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

impl AiConfig {
    /// Read the AI settings from the environment; None when no key is set
    /// (the engine then runs on the quant fallback alone)
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LLM_API_KEY").ok()?;
        if api_key.is_empty() {
            return None;
        }

        Some(Self {
            api_key,
            base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string()),
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_AI_MODEL.to_string()),
        })
    }
}
