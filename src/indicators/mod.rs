// Technical indicator module
// One file per indicator family; every function reports None instead of a
// fabricated value when the window is too short or the input is degenerate

pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod hurst;
pub mod macd;
pub mod moving_average;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod snapshot;
pub mod stats;

pub use atr::calculate_atr;
pub use bollinger::{band_position, calculate_bollinger, Bollinger};
pub use cci::calculate_cci;
pub use hurst::hurst_exponent;
pub use macd::{calculate_macd, Macd};
pub use moving_average::{calculate_ema, calculate_sma, ema_series};
pub use obv::calculate_obv;
pub use roc::calculate_roc;
pub use rsi::calculate_rsi;
pub use snapshot::IndicatorSnapshot;
pub use stats::{
    range_position, return_stddev, serial_correlation, skewness, volatility_ratio,
};
