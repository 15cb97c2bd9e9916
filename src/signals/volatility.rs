use crate::indicators::IndicatorSnapshot;

use super::{Signal, SignalKind};

/// Volatility-structure signal
///
/// The Hurst exponent contributes a persistence bucket; a volatility
/// expansion contributes magnitude with its direction taken from the
/// return skew. Without an expansion read, a pronounced skew alone leaves
/// a small directional residue.
pub fn volatility_signal(snapshot: &IndicatorSnapshot) -> Signal {
    const EXPECTED: usize = 3;

    let mut value = 0.0;
    let mut present = 0;

    if let Some(hurst) = snapshot.hurst {
        present += 1;

        if hurst > 0.6 {
            value += 0.2;
        } else if hurst < 0.4 {
            value -= 0.2;
        }
    }

    let skew_direction = snapshot.skewness.map(|skew| {
        if skew > 0.5 {
            1.0
        } else if skew < -0.5 {
            -1.0
        } else {
            0.0
        }
    });

    match (snapshot.volatility_ratio, skew_direction) {
        (Some(ratio), Some(direction)) => {
            present += 2;
            let expansion = (ratio - 1.0).max(0.0).tanh();
            value += direction * (0.1 + 0.5 * expansion);
        }
        (None, Some(direction)) => {
            present += 1;
            value += direction * 0.1;
        }
        (Some(_), None) => {
            // Expansion with no directional skew read carries no sign
            present += 1;
        }
        (None, None) => {}
    }

    Signal::bounded(SignalKind::Volatility, value, present, EXPECTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expansion_with_positive_skew_is_bullish() {
        let snapshot = IndicatorSnapshot {
            hurst: Some(0.7),
            volatility_ratio: Some(2.0),
            skewness: Some(1.2),
            ..IndicatorSnapshot::default()
        };

        let signal = volatility_signal(&snapshot);
        assert!(signal.value > 0.4);
        assert_eq!(signal.confidence, 1.0);
    }

    #[test]
    fn test_expansion_with_negative_skew_is_bearish() {
        let snapshot = IndicatorSnapshot {
            hurst: Some(0.5),
            volatility_ratio: Some(2.0),
            skewness: Some(-1.2),
            ..IndicatorSnapshot::default()
        };

        let signal = volatility_signal(&snapshot);
        assert!(signal.value < -0.4);
    }

    #[test]
    fn test_quiet_market_is_small() {
        let snapshot = IndicatorSnapshot {
            hurst: Some(0.5),
            volatility_ratio: Some(1.0),
            skewness: Some(0.0),
            ..IndicatorSnapshot::default()
        };

        let signal = volatility_signal(&snapshot);
        assert_eq!(signal.value, 0.0);
        assert_eq!(signal.confidence, 1.0);
    }

    #[test]
    fn test_mean_reverting_hurst_reads_bearish_bucket() {
        let snapshot = IndicatorSnapshot {
            hurst: Some(0.3),
            ..IndicatorSnapshot::default()
        };

        let signal = volatility_signal(&snapshot);
        assert_eq!(signal.value, -0.2);
        assert!(signal.confidence < 0.5);
    }

    #[test]
    fn test_empty_snapshot_is_neutral() {
        let signal = volatility_signal(&IndicatorSnapshot::default());
        assert_eq!(signal.value, 0.0);
        assert_eq!(signal.confidence, 0.0);
    }
}
