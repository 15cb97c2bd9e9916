use crate::models::PriceBar;

/// Calculate Commodity Channel Index over the trailing `period` bars
///
/// CCI = (typical price - SMA(typical)) / (0.015 * mean absolute deviation).
/// Readings beyond +/-100 mark strong directional pressure.
pub fn calculate_cci(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period < 2 || bars.len() < period {
        return None;
    }

    let typical: Vec<f64> = bars[bars.len() - period..]
        .iter()
        .map(|b| (b.high + b.low + b.close) / 3.0)
        .collect();

    let mean = typical.iter().sum::<f64>() / period as f64;
    let mean_deviation =
        typical.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / period as f64;

    if mean_deviation == 0.0 {
        return None;
    }

    let last = typical[typical.len() - 1];
    Some((last - mean) / (0.015 * mean_deviation))
}
