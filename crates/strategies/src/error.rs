// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Column '{0}' is missing from the data frame")]
    MissingColumn(String),

    #[error("Column '{column}' has {actual} rows but the frame has {expected}")]
    LengthMismatch { column: String, expected: usize, actual: usize },

    #[error("Rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("Need at least {required} candles, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Column '{column}' has no value at row {row}")]
    UndefinedValue { column: String, row: usize },

    #[error("No {kind} data for {pair} at {timeframe}")]
    MissingData { kind: &'static str, pair: String, timeframe: String },

    #[error("Current rate must be a positive price, got {0}")]
    InvalidRate(f64),

    #[error("Cannot merge {informative} candles onto the slower {base} series")]
    FasterInformative { informative: String, base: String },

    #[error("Price {value} in column '{column}' cannot be represented as f64")]
    UnrepresentablePrice { column: &'static str, value: String },

    #[error("Data frame error: {0}")]
    Frame(String),

    #[error("Stoploss {0} is not a finite fraction")]
    NonFiniteStoploss(f64),

    #[error(transparent)]
    Core(#[from] core_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
