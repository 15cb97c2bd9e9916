use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar for a single instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Immutable snapshot of the bar history for one instrument, consumed by a
/// single evaluation cycle.
///
/// Timestamps must be strictly increasing. Gaps between bars are tolerated;
/// indicators that cannot cope with short history report themselves
/// unavailable instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceWindow {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceWindow {
    /// Build a window, rejecting out-of-order or duplicate timestamps
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> crate::Result<Self> {
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(format!(
                    "price bars not strictly increasing: {} followed by {}",
                    pair[0].timestamp, pair[1].timestamp
                )
                .into());
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices, oldest first
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Traded volumes, oldest first
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Log returns of consecutive closes; empty when fewer than two bars
    /// or when any close is non-positive
    pub fn log_returns(&self) -> Vec<f64> {
        if self.bars.len() < 2 {
            return Vec::new();
        }
        if self.bars.iter().any(|b| b.close <= 0.0) {
            return Vec::new();
        }

        self.bars
            .windows(2)
            .map(|pair| (pair[1].close / pair[0].close).ln())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bar(offset_hours: i64, close: f64) -> PriceBar {
        let base = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        PriceBar {
            timestamp: base + Duration::hours(offset_hours),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_window_accepts_ordered_bars() {
        let window = PriceWindow::new("SOL", vec![bar(0, 100.0), bar(1, 101.0)]).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.symbol(), "SOL");
    }

    #[test]
    fn test_window_rejects_unordered_bars() {
        let result = PriceWindow::new("SOL", vec![bar(1, 100.0), bar(0, 101.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_window_rejects_duplicate_timestamps() {
        let result = PriceWindow::new("SOL", vec![bar(0, 100.0), bar(0, 101.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_window_tolerates_gaps() {
        // A missing hour is not an error
        let window = PriceWindow::new("SOL", vec![bar(0, 100.0), bar(5, 101.0)]).unwrap();
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_log_returns() {
        let window =
            PriceWindow::new("SOL", vec![bar(0, 100.0), bar(1, 110.0), bar(2, 99.0)]).unwrap();
        let returns = window.log_returns();

        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!(returns[1] < 0.0);
    }

    #[test]
    fn test_log_returns_empty_for_short_window() {
        let window = PriceWindow::new("SOL", vec![bar(0, 100.0)]).unwrap();
        assert!(window.log_returns().is_empty());
    }
}
