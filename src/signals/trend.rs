use crate::indicators::IndicatorSnapshot;

use super::{Signal, SignalKind};

/// Trend-following signal
///
/// Driven by the fast/slow EMA spread (tanh-bounded), with an alignment
/// bonus when price and both averages stack in order, MACD histogram
/// confirmation, and RSI moderation: a trend with room to run is
/// strengthened, an exhausted one attenuated.
pub fn trend_signal(snapshot: &IndicatorSnapshot) -> Signal {
    const EXPECTED: usize = 3;

    let mut value = 0.0;
    let mut present = 0;

    if let (Some(fast), Some(slow), Some(close)) =
        (snapshot.ema_fast, snapshot.ema_slow, snapshot.last_close)
    {
        present += 1;

        if slow != 0.0 {
            let spread = (fast - slow) / slow;
            value += 0.5 * (spread * 40.0).tanh();
        }

        if close > fast && fast > slow {
            value += 0.2;
        } else if close < fast && fast < slow {
            value -= 0.2;
        }
    }

    if let Some(macd) = snapshot.macd {
        present += 1;

        if macd.histogram > 0.0 {
            value += 0.3;
        } else if macd.histogram < 0.0 {
            value -= 0.3;
        }
    }

    if let Some(rsi) = snapshot.rsi {
        present += 1;

        // Inside the neutral band the trend has room to continue
        if rsi > 30.0 && rsi < 70.0 {
            value *= 1.2;
        } else {
            value *= 0.8;
        }
    }

    Signal::bounded(SignalKind::Trend, value, present, EXPECTED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::Macd;

    fn uptrend_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            last_close: Some(110.0),
            ema_fast: Some(107.0),
            ema_slow: Some(100.0),
            macd: Some(Macd {
                line: 2.0,
                signal: 1.0,
                histogram: 1.0,
            }),
            rsi: Some(60.0),
            ..IndicatorSnapshot::default()
        }
    }

    #[test]
    fn test_uptrend_is_bullish() {
        let signal = trend_signal(&uptrend_snapshot());

        assert!(signal.value > 0.5);
        assert!(signal.value <= 1.0);
        assert_eq!(signal.confidence, 1.0);
    }

    #[test]
    fn test_downtrend_is_bearish() {
        let snapshot = IndicatorSnapshot {
            last_close: Some(90.0),
            ema_fast: Some(93.0),
            ema_slow: Some(100.0),
            macd: Some(Macd {
                line: -2.0,
                signal: -1.0,
                histogram: -1.0,
            }),
            rsi: Some(40.0),
            ..IndicatorSnapshot::default()
        };

        let signal = trend_signal(&snapshot);
        assert!(signal.value < -0.5);
    }

    #[test]
    fn test_overbought_attenuates() {
        let mut snapshot = uptrend_snapshot();
        let neutral = trend_signal(&snapshot).value;

        snapshot.rsi = Some(80.0);
        let exhausted = trend_signal(&snapshot).value;

        assert!(exhausted < neutral);
        assert!(exhausted > 0.0);
    }

    #[test]
    fn test_missing_indicators_reduce_confidence() {
        let snapshot = IndicatorSnapshot {
            last_close: Some(110.0),
            ema_fast: Some(107.0),
            ema_slow: Some(100.0),
            ..IndicatorSnapshot::default()
        };

        let signal = trend_signal(&snapshot);
        assert!(signal.confidence < 1.0);
        assert!(signal.confidence > 0.0);
    }

    #[test]
    fn test_empty_snapshot_is_neutral() {
        let signal = trend_signal(&IndicatorSnapshot::default());
        assert_eq!(signal.value, 0.0);
        assert_eq!(signal.confidence, 0.0);
    }
}
