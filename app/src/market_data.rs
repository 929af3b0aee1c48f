// In app/src/market_data.rs

use std::path::Path;

use anyhow::{Context, Result};
use core_types::Kline;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One line of a candle file: `open_time,open,high,low,close,volume`.
#[derive(Debug, Deserialize)]
struct CandleRow {
    open_time: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl From<CandleRow> for Kline {
    fn from(row: CandleRow) -> Self {
        Kline {
            open_time: row.open_time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Reads a candle file in ascending `open_time` order.
pub fn load_klines(path: &Path) -> Result<Vec<Kline>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open candle file {}", path.display()))?;

    let klines = reader
        .deserialize::<CandleRow>()
        .map(|row| row.map(Kline::from))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to parse candle file {}", path.display()))?;

    tracing::debug!(path = %path.display(), candles = klines.len(), "Loaded candles.");
    Ok(klines)
}
