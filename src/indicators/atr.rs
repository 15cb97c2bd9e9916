use crate::models::PriceBar;

/// Calculate Average True Range with Wilder smoothing
///
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let mut true_ranges = Vec::with_capacity(bars.len() - 1);
    for pair in bars.windows(2) {
        let high = pair[1].high;
        let low = pair[1].low;
        let prev_close = pair[0].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());
        true_ranges.push(tr);
    }

    let mut atr: f64 = true_ranges[..period].iter().sum::<f64>() / period as f64;
    for tr in &true_ranges[period..] {
        atr = (atr * (period as f64 - 1.0) + tr) / period as f64;
    }

    Some(atr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bars(ohlc: &[(f64, f64, f64, f64)]) -> Vec<PriceBar> {
        ohlc.iter()
            .enumerate()
            .map(|(i, &(open, high, low, close))| PriceBar {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                    + Duration::hours(i as i64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_atr_quiet_market() {
        let quiet = vec![(100.0, 101.0, 99.0, 100.0); 15];
        let atr = calculate_atr(&bars(&quiet), 14).unwrap();

        // Range is constantly 2.0
        assert!((atr - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_atr_reflects_gaps() {
        let mut ohlc = vec![(100.0, 101.0, 99.0, 100.0); 14];
        // Gap up: true range driven by distance from previous close
        ohlc.push((120.0, 121.0, 119.0, 120.0));

        let atr = calculate_atr(&bars(&ohlc), 14).unwrap();
        assert!(atr > 2.0);
    }

    #[test]
    fn test_atr_insufficient_data() {
        let quiet = vec![(100.0, 101.0, 99.0, 100.0); 10];
        assert!(calculate_atr(&bars(&quiet), 14).is_none());
    }
}
