// In crates/core-types/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A trading pair in `BASE/QUOTE` notation, e.g. `ETH/USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// The base asset (`ETH` in `ETH/USDT`). A symbol without a `/` is all base.
    pub fn base(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(base, _)| base)
    }

    /// The quote asset (`USDT` in `ETH/USDT`), if the symbol has one.
    pub fn quote(&self) -> Option<&str> {
        self.0
            .split_once('/')
            .map(|(_, quote)| quote.split(':').next().unwrap_or(quote))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(value.to_string())
    }
}

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

/// A single OHLCV candle as delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Candle open time in milliseconds since the Unix epoch.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// The entry/exit decision read off the latest analyzed candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
    Hold,
}

/// Read-only view of an open position, owned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// The pair this trade was opened on.
    pub pair: String,
    /// `true` for a short position.
    pub is_short: bool,
    /// Average entry price.
    pub open_rate: f64,
    /// Time the entry order filled.
    pub open_date: DateTime<Utc>,
    /// Position size in base currency.
    pub amount: f64,
}

impl Trade {
    pub fn side(&self) -> Side {
        if self.is_short { Side::Short } else { Side::Long }
    }

    /// Checks the fields a stoploss callback may rely on.
    pub fn validate(&self) -> Result<()> {
        if self.pair.trim().is_empty() {
            return Err(Error::InvalidTrade {
                pair: self.pair.clone(),
                reason: "pair is empty".to_string(),
            });
        }
        if !self.open_rate.is_finite() || self.open_rate <= 0.0 {
            return Err(Error::InvalidTrade {
                pair: self.pair.clone(),
                reason: format!("open_rate must be a positive price, got {}", self.open_rate),
            });
        }
        Ok(())
    }
}
