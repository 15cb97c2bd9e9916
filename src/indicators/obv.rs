use crate::models::PriceBar;

/// Calculate cumulative On-Balance-Volume over the window
///
/// Volume is added on up-closes, subtracted on down-closes, and ignored on
/// unchanged closes.
pub fn calculate_obv(bars: &[PriceBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }

    let mut obv = 0.0;
    for pair in bars.windows(2) {
        if pair[1].close > pair[0].close {
            obv += pair[1].volume;
        } else if pair[1].close < pair[0].close {
            obv -= pair[1].volume;
        }
    }

    Some(obv)
}
