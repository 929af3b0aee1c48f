// In crates/strategies/src/types.rs

use std::collections::BTreeMap;

use core_types::Timeframe;
use serde::{Deserialize, Serialize};

/// Parameters of the single-symbol breakout strategy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BreakoutSettings {
    /// Look-back of the breakout channel (`high_20` / `low_20`).
    pub breakout_window: usize,
    /// Look-back of the trailing stop extreme (`high_3` / `low_3`).
    pub stop_window: usize,
    /// Value returned by the stoploss callback when the stop cannot be computed.
    pub fallback_stoploss: f64,
}

impl Default for BreakoutSettings {
    fn default() -> Self {
        Self {
            breakout_window: 20,
            stop_window: 3,
            fallback_stoploss: 0.99,
        }
    }
}

/// Parameters of the reference-asset breakout strategy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PairBreakoutSettings {
    /// Pair whose breakout triggers entries. `{stake}` is replaced with the stake currency.
    pub reference_asset: String,
    pub breakout_window: usize,
    pub stop_window: usize,
}

impl Default for PairBreakoutSettings {
    fn default() -> Self {
        Self {
            reference_asset: "BTC/{stake}".to_string(),
            breakout_window: 20,
            stop_window: 3,
        }
    }
}

/// Host-read strategy attributes. The strategy itself never consults these.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyProfile {
    pub timeframe: Timeframe,
    pub can_short: bool,
    pub use_custom_stoploss: bool,
    pub minimal_roi: MinimalRoi,
    /// Base stoploss the host applies before the custom callback runs.
    pub stoploss: f64,
    /// `None` leaves the limit to the host configuration.
    pub max_open_trades: Option<u32>,
    pub process_only_new_candles: bool,
    /// Candles the host must supply before the first callback.
    pub startup_candle_count: usize,
}

/// Minimum return required to exit, keyed by minutes since the trade opened.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MinimalRoi(BTreeMap<u32, f64>);

impl MinimalRoi {
    pub fn new(table: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self(table.into_iter().collect())
    }

    /// ROI threshold in force `minutes` after entry: the entry with the largest key not above it.
    pub fn threshold_at(&self, minutes: u32) -> Option<f64> {
        self.0.range(..=minutes).next_back().map(|(_, roi)| *roi)
    }
}
