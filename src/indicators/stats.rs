use crate::models::PriceBar;

/// Population standard deviation of the trailing `period` values
pub fn return_stddev(returns: &[f64], period: usize) -> Option<f64> {
    if period < 2 || returns.len() < period {
        return None;
    }

    let window = &returns[returns.len() - period..];
    let stddev = population_stddev(window)?;
    Some(stddev)
}

/// Ratio of the current rolling return volatility to its trailing average
/// across the whole window
///
/// A reading above 1.0 means volatility is expanding; the regime classifier
/// treats readings above its configured multiple as a volatility override.
pub fn volatility_ratio(returns: &[f64], period: usize) -> Option<f64> {
    if period < 2 || returns.len() < period + 1 {
        return None;
    }

    let mut series = Vec::with_capacity(returns.len() - period + 1);
    for end in period..=returns.len() {
        let stddev = population_stddev(&returns[end - period..end])?;
        series.push(stddev);
    }

    let current = series[series.len() - 1];
    let average = series.iter().sum::<f64>() / series.len() as f64;
    if average == 0.0 {
        return None;
    }

    Some(current / average)
}

/// Sample skewness of the trailing `period` values
pub fn skewness(returns: &[f64], period: usize) -> Option<f64> {
    if period < 3 || returns.len() < period {
        return None;
    }

    let window = &returns[returns.len() - period..];
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let m2 = window.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let m3 = window.iter().map(|r| (r - mean).powi(3)).sum::<f64>() / n;

    if m2 == 0.0 {
        return None;
    }

    let skew = m3 / m2.powf(1.5);
    skew.is_finite().then_some(skew)
}

/// Pearson correlation between the price series and its own lag-1 shift
/// over the trailing `period` points
///
/// Serves as the statistical reference-series correlation: near 1.0 for
/// smoothly drifting prices, lower for choppy ones.
pub fn serial_correlation(prices: &[f64], period: usize) -> Option<f64> {
    if period < 3 || prices.len() < period + 1 {
        return None;
    }

    let current = &prices[prices.len() - period..];
    let lagged = &prices[prices.len() - period - 1..prices.len() - 1];

    let n = period as f64;
    let mean_x = current.iter().sum::<f64>() / n;
    let mean_y = lagged.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for i in 0..period {
        let dx = current[i] - mean_x;
        let dy = lagged[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    let corr = cov / (var_x.sqrt() * var_y.sqrt());
    corr.is_finite().then_some(corr)
}

/// Stochastic-style position of the latest close inside the trailing
/// high/low range: 0 at the range low, 1 at the range high
pub fn range_position(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let window = &bars[bars.len() - period..];
    let high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

    if high <= low {
        return None;
    }

    let close = window[window.len() - 1].close;
    Some(((close - low) / (high - low)).clamp(0.0, 1.0))
}

fn population_stddev(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    stddev.is_finite().then_some(stddev)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(ohlc: &[(f64, f64, f64)]) -> Vec<PriceBar> {
        ohlc.iter()
            .enumerate()
            .map(|(i, &(high, low, close))| PriceBar {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::hours(i as i64),
                open: close,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_return_stddev() {
        let returns = vec![0.01, -0.01, 0.01, -0.01];
        let stddev = return_stddev(&returns, 4).unwrap();
        assert!((stddev - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_volatility_ratio_expansion() {
        // Quiet stretch followed by a burst
        let mut returns = vec![0.001, -0.001].repeat(15);
        returns.extend_from_slice(&[0.05, -0.05, 0.05, -0.05, 0.05]);

        let ratio = volatility_ratio(&returns, 5).unwrap();
        assert!(ratio > 1.5);
    }

    #[test]
    fn test_volatility_ratio_flat_series_unavailable() {
        let returns = vec![0.0; 30];
        assert!(volatility_ratio(&returns, 5).is_none());
    }

    #[test]
    fn test_skewness_sign() {
        // One large positive outlier drives positive skew
        let mut returns = vec![-0.001; 19];
        returns.push(0.10);
        assert!(skewness(&returns, 20).unwrap() > 1.0);

        let mut returns = vec![0.001; 19];
        returns.push(-0.10);
        assert!(skewness(&returns, 20).unwrap() < -1.0);
    }

    #[test]
    fn test_serial_correlation_of_drift() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let corr = serial_correlation(&prices, 10).unwrap();
        assert!(corr > 0.99);
    }

    #[test]
    fn test_serial_correlation_flat_unavailable() {
        let prices = vec![100.0; 20];
        assert!(serial_correlation(&prices, 10).is_none());
    }

    #[test]
    fn test_range_position() {
        let data = vec![
            (110.0, 90.0, 100.0),
            (110.0, 90.0, 100.0),
            (110.0, 90.0, 105.0),
        ];
        let pos = range_position(&bars(&data), 3).unwrap();
        assert!((pos - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_range_position_degenerate_range() {
        let data = vec![(100.0, 100.0, 100.0); 5];
        assert!(range_position(&bars(&data), 5).is_none());
    }
}
