// Core modules
pub mod config;
pub mod decision;
pub mod engine;
pub mod indicators;
pub mod models;
pub mod regime;
pub mod risk;
pub mod signals;
pub mod synthetic;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::Engine;
pub use models::{PriceBar, PriceWindow};

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
