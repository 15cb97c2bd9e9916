// Risk management module
pub mod sizer;

pub use sizer::{PositionSizeRecommendation, PositionSizer, TradeStats};
