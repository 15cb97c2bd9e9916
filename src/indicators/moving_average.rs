/// Calculate Simple Moving Average over the trailing `period` values
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let sum: f64 = values[values.len() - period..].iter().sum();
    Some(sum / period as f64)
}

/// Calculate Exponential Moving Average, seeded with the SMA of the first
/// `period` values
pub fn calculate_ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period)?.last().copied()
}

/// Full EMA series aligned to `values[period - 1..]`
///
/// Returns None when there are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;

    let mut series = Vec::with_capacity(values.len() - period + 1);
    let mut ema = seed;
    series.push(ema);
    for value in &values[period..] {
        ema = (value - ema) * multiplier + ema;
        series.push(ema);
    }

    Some(series)
}
