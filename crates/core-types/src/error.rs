// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid timeframe '{0}'")]
    InvalidTimeframe(String),

    #[error("Candle series is not strictly increasing at index {index} (open_time {open_time})")]
    NonMonotonicSeries { index: usize, open_time: i64 },

    #[error("Invalid trade for '{pair}': {reason}")]
    InvalidTrade { pair: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
