use crate::indicators::IndicatorSnapshot;

use super::{Signal, SignalKind};

/// Mean-reversion signal
///
/// Fades RSI and Bollinger-position extremes: oversold reads bullish,
/// overbought bearish, with a stronger contribution the further the reading
/// sits from neutral.
pub fn mean_reversion_signal(snapshot: &IndicatorSnapshot) -> Signal {
    const EXPECTED: usize = 2;

    let mut value = 0.0;
    let mut present = 0;

    if let Some(rsi) = snapshot.rsi {
        present += 1;

        value += if rsi < 30.0 {
            0.8
        } else if rsi < 40.0 {
            0.5
        } else if rsi > 70.0 {
            -0.8
        } else if rsi > 60.0 {
            -0.5
        } else {
            0.0
        };
    }

    if let Some(position) = snapshot.bollinger_position {
        present += 1;

        value += if position < 0.2 {
            0.6
        } else if position < 0.3 {
            0.4
        } else if position > 0.8 {
            -0.6
        } else if position > 0.7 {
            -0.4
        } else {
            0.0
        };
    }

    Signal::bounded(SignalKind::MeanReversion, value, present, EXPECTED)
}
