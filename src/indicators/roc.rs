/// Calculate Rate of Change: percent move of the last price against the
/// price `period` bars earlier
pub fn calculate_roc(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let current = prices[prices.len() - 1];
    let reference = prices[prices.len() - 1 - period];
    if reference == 0.0 {
        return None;
    }

    Some((current - reference) / reference * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roc_positive_move() {
        let prices = vec![100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0, 107.0, 108.0, 109.0, 110.0];
        let roc = calculate_roc(&prices, 10).unwrap();
        assert!((roc - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_roc_negative_move() {
        let prices = vec![100.0, 95.0];
        let roc = calculate_roc(&prices, 1).unwrap();
        assert!((roc + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_roc_insufficient_data() {
        assert!(calculate_roc(&[100.0, 101.0], 10).is_none());
    }
}
