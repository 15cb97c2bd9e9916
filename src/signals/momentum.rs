use crate::indicators::IndicatorSnapshot;

use super::{Signal, SignalKind};

/// Momentum signal
///
/// Rate-of-change direction, MACD histogram slope, and CCI level, gated by
/// volume: conviction without participation is attenuated, participation
/// above average amplified.
pub fn momentum_signal(snapshot: &IndicatorSnapshot) -> Signal {
    const EXPECTED: usize = 4;

    let mut value = 0.0;
    let mut present = 0;

    if let Some(roc) = snapshot.roc {
        present += 1;
        value += 0.4 * roc.tanh();
    }

    if let Some(slope) = snapshot.macd_hist_slope {
        present += 1;

        if slope > 0.0 {
            value += 0.3;
        } else if slope < 0.0 {
            value -= 0.3;
        }
    }

    if let Some(cci) = snapshot.cci {
        present += 1;

        value += if cci > 100.0 {
            0.3
        } else if cci < -100.0 {
            -0.3
        } else if cci > 0.0 {
            0.1
        } else if cci < 0.0 {
            -0.1
        } else {
            0.0
        };
    }

    if let Some(volume_ratio) = snapshot.volume_sma_ratio {
        present += 1;

        // Volume confirmation gate
        if volume_ratio > 1.2 {
            value *= 1.2;
        } else if volume_ratio < 1.0 {
            value *= 0.8;
        }
    }

    Signal::bounded(SignalKind::Momentum, value, present, EXPECTED)
}
