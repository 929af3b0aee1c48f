// In crates/core-types/src/timeframe.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A candle interval such as `"5m"`, `"1h"` or `"1d"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    amount: u32,
    unit: TimeframeUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TimeframeUnit {
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeframeUnit {
    fn seconds(self) -> i64 {
        match self {
            TimeframeUnit::Minute => 60,
            TimeframeUnit::Hour => 3_600,
            TimeframeUnit::Day => 86_400,
            TimeframeUnit::Week => 604_800,
        }
    }

    fn suffix(self) -> char {
        match self {
            TimeframeUnit::Minute => 'm',
            TimeframeUnit::Hour => 'h',
            TimeframeUnit::Day => 'd',
            TimeframeUnit::Week => 'w',
        }
    }
}

impl Timeframe {
    pub const ONE_HOUR: Timeframe = Timeframe { amount: 1, unit: TimeframeUnit::Hour };

    /// Length of one candle in seconds.
    pub fn seconds(&self) -> i64 {
        i64::from(self.amount) * self.unit.seconds()
    }

    /// Length of one candle in milliseconds, the unit of `Kline::open_time`.
    pub fn millis(&self) -> i64 {
        self.seconds() * 1_000
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTimeframe(s.to_string());
        let trimmed = s.trim();
        let suffix = trimmed.chars().last().ok_or_else(invalid)?;
        let unit = match suffix {
            'm' => TimeframeUnit::Minute,
            'h' => TimeframeUnit::Hour,
            'd' => TimeframeUnit::Day,
            'w' => TimeframeUnit::Week,
            _ => return Err(invalid()),
        };
        let amount: u32 = trimmed[..trimmed.len() - 1].parse().map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}
