// In crates/core-types/src/lib.rs

pub mod error;
pub mod strategy;
pub mod timeframe;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use strategy::StrategyConfig;
pub use timeframe::Timeframe;
pub use types::{Kline, Side, Signal, Symbol, Trade};
