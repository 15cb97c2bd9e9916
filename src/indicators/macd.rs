use serde::{Deserialize, Serialize};

use super::moving_average::ema_series;

/// Moving Average Convergence Divergence reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Calculate MACD: line = EMA(fast) - EMA(slow), signal = EMA(line, signal
/// period), histogram = line - signal
///
/// Needs `slow + signal_period - 1` prices for a full signal line.
pub fn calculate_macd(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<Macd> {
    macd_series(prices, fast, slow, signal_period)?.last().copied()
}

/// MACD readings for every bar once the signal line is warm
pub fn macd_series(
    prices: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<Vec<Macd>> {
    if fast == 0 || signal_period == 0 || fast >= slow {
        return None;
    }
    if prices.len() < slow + signal_period - 1 {
        return None;
    }

    let fast_series = ema_series(prices, fast)?;
    let slow_series = ema_series(prices, slow)?;

    // Align the two EMA series on the slow warm-up point
    let offset = fast_series.len() - slow_series.len();
    let line: Vec<f64> = slow_series
        .iter()
        .enumerate()
        .map(|(i, s)| fast_series[i + offset] - s)
        .collect();

    let signal = ema_series(&line, signal_period)?;
    let line_offset = line.len() - signal.len();

    let series = signal
        .iter()
        .enumerate()
        .map(|(i, &sig)| {
            let l = line[i + line_offset];
            Macd {
                line: l,
                signal: sig,
                histogram: l - sig,
            }
        })
        .collect();

    Some(series)
}
