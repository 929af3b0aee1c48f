// In crates/strategies/src/provider.rs

use std::collections::HashMap;

use core_types::{Kline, Timeframe};

use crate::frame::DataFrame;

/// Read access to the candles and analyzed frames the host holds.
pub trait DataProvider {
    /// Raw candles for `pair` at `timeframe`.
    fn ohlcv(&self, pair: &str, timeframe: Timeframe) -> Option<&[Kline]>;

    /// The frame produced by the most recent analysis of `pair` at `timeframe`.
    fn analyzed_frame(&self, pair: &str, timeframe: Timeframe) -> Option<&DataFrame>;
}

/// A `DataProvider` backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryDataProvider {
    candles: HashMap<(String, Timeframe), Vec<Kline>>,
    analyzed: HashMap<(String, Timeframe), DataFrame>,
}

impl MemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_candles(&mut self, pair: impl Into<String>, timeframe: Timeframe, klines: Vec<Kline>) {
        self.candles.insert((pair.into(), timeframe), klines);
    }

    pub fn store_analyzed(&mut self, pair: impl Into<String>, timeframe: Timeframe, frame: DataFrame) {
        self.analyzed.insert((pair.into(), timeframe), frame);
    }
}

impl DataProvider for MemoryDataProvider {
    fn ohlcv(&self, pair: &str, timeframe: Timeframe) -> Option<&[Kline]> {
        self.candles.get(&(pair.to_string(), timeframe)).map(Vec::as_slice)
    }

    fn analyzed_frame(&self, pair: &str, timeframe: Timeframe) -> Option<&DataFrame> {
        self.analyzed.get(&(pair.to_string(), timeframe))
    }
}
