use serde::{Deserialize, Serialize};

use crate::models::PriceWindow;

use super::{
    atr::calculate_atr,
    bollinger::{band_position, calculate_bollinger, Bollinger},
    cci::calculate_cci,
    hurst::hurst_exponent,
    macd::{macd_series, Macd},
    moving_average::{calculate_ema, calculate_sma},
    obv::calculate_obv,
    roc::calculate_roc,
    rsi::calculate_rsi,
    stats::{range_position, return_stddev, serial_correlation, skewness, volatility_ratio},
};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const CCI_PERIOD: usize = 20;
pub const ROC_PERIOD: usize = 10;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_K: f64 = 2.0;
pub const ATR_PERIOD: usize = 14;
pub const STDDEV_PERIOD: usize = 20;
pub const SKEW_PERIOD: usize = 20;
pub const CORRELATION_PERIOD: usize = 10;
pub const RANGE_PERIOD: usize = 14;
pub const VOLUME_SMA_PERIOD: usize = 20;
pub const EMA_FAST_PERIOD: usize = 20;
pub const EMA_SLOW_PERIOD: usize = 50;

/// Minimum bars for every indicator to be available (slowest average plus
/// warm-up buffer)
pub const FULL_LOOKBACK: usize = 60;

/// All indicator readings derived from one price window
///
/// Every field is either a finite reading or None ("unavailable") when the
/// window is too short or the input degenerate. Downstream signal
/// generators treat None as a zero contribution and lower their confidence
/// accordingly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub last_close: Option<f64>,

    // Momentum
    pub rsi: Option<f64>,
    pub macd: Option<Macd>,
    pub macd_hist_slope: Option<f64>,
    pub cci: Option<f64>,
    pub roc: Option<f64>,

    // Volatility
    pub bollinger: Option<Bollinger>,
    pub atr: Option<f64>,
    pub return_stddev: Option<f64>,
    pub volatility_ratio: Option<f64>,

    // Volume
    pub obv: Option<f64>,
    pub volume_sma_ratio: Option<f64>,

    // Statistical
    pub serial_correlation: Option<f64>,
    pub skewness: Option<f64>,
    pub hurst: Option<f64>,

    // Price position
    pub bollinger_position: Option<f64>,
    pub range_position: Option<f64>,

    // Trend anchors
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
}

impl IndicatorSnapshot {
    /// Compute every indicator the window supports
    pub fn compute(window: &PriceWindow) -> Self {
        let bars = window.bars();
        let closes = window.closes();
        let volumes = window.volumes();
        let returns = window.log_returns();

        let last_close = closes.last().copied().filter(|c| c.is_finite());

        let macd_readings = macd_series(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
        let macd = macd_readings.as_ref().and_then(|s| s.last().copied());
        let macd_hist_slope = macd_readings.as_ref().and_then(|s| {
            if s.len() < 2 {
                return None;
            }
            Some(s[s.len() - 1].histogram - s[s.len() - 2].histogram)
        });

        let bollinger = calculate_bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_K);
        let bollinger_position = match (last_close, bollinger.as_ref()) {
            (Some(close), Some(bands)) => band_position(close, bands),
            _ => None,
        };

        let volume_sma_ratio = match (
            volumes.last(),
            calculate_sma(&volumes, VOLUME_SMA_PERIOD),
        ) {
            (Some(&current), Some(average)) if average > 0.0 => Some(current / average),
            _ => None,
        };

        Self {
            last_close,
            rsi: calculate_rsi(&closes, RSI_PERIOD),
            macd,
            macd_hist_slope,
            cci: calculate_cci(bars, CCI_PERIOD),
            roc: calculate_roc(&closes, ROC_PERIOD),
            bollinger,
            atr: calculate_atr(bars, ATR_PERIOD),
            return_stddev: return_stddev(&returns, STDDEV_PERIOD),
            volatility_ratio: volatility_ratio(&returns, STDDEV_PERIOD),
            obv: calculate_obv(bars),
            volume_sma_ratio,
            serial_correlation: serial_correlation(&closes, CORRELATION_PERIOD),
            skewness: skewness(&returns, SKEW_PERIOD),
            hurst: hurst_exponent(&closes),
            bollinger_position,
            range_position: range_position(bars, RANGE_PERIOD),
            ema_fast: calculate_ema(&closes, EMA_FAST_PERIOD),
            ema_slow: calculate_ema(&closes, EMA_SLOW_PERIOD),
        }
    }
}
