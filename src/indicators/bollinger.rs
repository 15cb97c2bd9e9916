use serde::{Deserialize, Serialize};

use super::moving_average::calculate_sma;

/// Bollinger Band reading: SMA middle band with bands at `k` standard
/// deviations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bollinger {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Calculate Bollinger Bands over the trailing `period` prices
pub fn calculate_bollinger(prices: &[f64], period: usize, k: f64) -> Option<Bollinger> {
    if period < 2 || prices.len() < period {
        return None;
    }

    let middle = calculate_sma(prices, period)?;
    let window = &prices[prices.len() - period..];
    let variance =
        window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
    let stddev = variance.sqrt();

    if !stddev.is_finite() {
        return None;
    }

    Some(Bollinger {
        upper: middle + k * stddev,
        middle,
        lower: middle - k * stddev,
        width: 2.0 * k * stddev,
    })
}

/// Normalized position of `close` inside the band range: 0 at the lower
/// band, 1 at the upper band
///
/// A zero-width band has no defined position, so None.
pub fn band_position(close: f64, bands: &Bollinger) -> Option<f64> {
    if bands.width <= 0.0 {
        return None;
    }

    Some((close - bands.lower) / (bands.upper - bands.lower))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_bracket_the_mean() {
        let prices = vec![
            100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0, 100.0, 101.0, 99.0,
            102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0,
        ];
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();

        assert!(bands.lower < bands.middle && bands.middle < bands.upper);
        assert!((bands.width - (bands.upper - bands.lower)).abs() < 1e-12);
    }

    #[test]
    fn test_band_position_midpoint() {
        let prices = vec![
            100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0, 100.0, 101.0, 99.0,
            102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0,
        ];
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();

        let middle = band_position(bands.middle, &bands).unwrap();
        assert!((middle - 0.5).abs() < 1e-12);
        assert_eq!(band_position(bands.upper, &bands), Some(1.0));
    }

    #[test]
    fn test_flat_series_has_no_position() {
        let prices = vec![100.0; 20];
        let bands = calculate_bollinger(&prices, 20, 2.0).unwrap();

        assert_eq!(bands.width, 0.0);
        assert!(band_position(100.0, &bands).is_none());
    }

    #[test]
    fn test_insufficient_data() {
        assert!(calculate_bollinger(&[100.0, 101.0], 20, 2.0).is_none());
    }
}
