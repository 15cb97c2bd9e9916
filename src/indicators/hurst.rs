/// Hurst exponent by rescaled-range (R/S) analysis of the log returns
///
/// The return series is split into non-overlapping segments at several
/// segment sizes n. For each segment, R is the range of the cumulative
/// mean-deviated sums and S the population standard deviation; R/S is
/// averaged per size, and H is the least-squares slope of log(R/S) against
/// log(n).
///
/// Interpretation:
/// - H > 0.5: trending (persistent) series
/// - H < 0.5: mean-reverting (anti-persistent) series
/// - H near 0.5: random walk
///
/// Returns None when the window is too short (< 20 returns) or the series
/// is degenerate (all segments with zero variance).
pub fn hurst_exponent(prices: &[f64]) -> Option<f64> {
    if prices.len() < 21 || prices.iter().any(|p| *p <= 0.0) {
        return None;
    }

    let returns: Vec<f64> = prices
        .windows(2)
        .map(|pair| (pair[1] / pair[0]).ln())
        .collect();
    if returns.len() < 20 {
        return None;
    }

    let max_scale = (returns.len() / 2).min(50);
    if max_scale <= 10 {
        return None;
    }

    let mut log_scales = Vec::new();
    let mut log_rs = Vec::new();

    for scale in 10..max_scale {
        let mut ratios = Vec::new();

        let mut start = 0;
        while start + scale <= returns.len() {
            let segment = &returns[start..start + scale];
            if let Some(ratio) = rescaled_range(segment) {
                ratios.push(ratio);
            }
            start += scale;
        }

        if ratios.is_empty() {
            continue;
        }

        let mean_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;
        if mean_ratio <= 0.0 {
            continue;
        }

        log_scales.push((scale as f64).ln());
        log_rs.push(mean_ratio.ln());
    }

    if log_scales.len() < 2 {
        return None;
    }

    let slope = regression_slope(&log_scales, &log_rs)?;
    slope.is_finite().then_some(slope)
}

/// R/S statistic for one segment; None when the segment has zero variance
fn rescaled_range(segment: &[f64]) -> Option<f64> {
    let n = segment.len() as f64;
    let mean = segment.iter().sum::<f64>() / n;

    let mut cumulative = 0.0;
    let mut max_dev = f64::NEG_INFINITY;
    let mut min_dev = f64::INFINITY;
    for value in segment {
        cumulative += value - mean;
        max_dev = max_dev.max(cumulative);
        min_dev = min_dev.min(cumulative);
    }
    let range = max_dev - min_dev;

    let variance = segment.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev == 0.0 || !stddev.is_finite() {
        return None;
    }

    Some(range / stddev)
}

fn regression_slope(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for i in 0..xs.len() {
        let dx = xs[i] - mean_x;
        cov += dx * (ys[i] - mean_y);
        var += dx * dx;
    }

    if var == 0.0 {
        return None;
    }

    Some(cov / var)
}
