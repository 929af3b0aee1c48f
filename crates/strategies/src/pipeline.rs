// In crates/strategies/src/pipeline.rs

//! Drives a strategy's populate callbacks the way the host does on each new candle.

use core_types::{Signal, Symbol, Timeframe};

use crate::frame::DataFrame;
use crate::informative::merge_informative;
use crate::provider::{DataProvider, MemoryDataProvider};
use crate::{Error, PairMetadata, Result, Strategy};

fn candles_frame(dp: &dyn DataProvider, pair: &str, timeframe: Timeframe) -> Result<DataFrame> {
    let klines = dp.ohlcv(pair, timeframe).ok_or_else(|| Error::MissingData {
        kind: "candle",
        pair: pair.to_string(),
        timeframe: timeframe.to_string(),
    })?;
    DataFrame::from_klines(klines)
}

/// Builds the fully analyzed frame for `pair` without storing it.
///
/// Informative series are fetched, populated and merged first, then the
/// indicator, entry and exit callbacks run on the result.
pub fn analyze_frame(
    strategy: &dyn Strategy,
    dp: &dyn DataProvider,
    pair: &str,
    stake_currency: &str,
) -> Result<DataFrame> {
    let timeframe = strategy.profile().timeframe;
    let metadata = PairMetadata {
        pair: Symbol::from(pair),
        stake_currency: stake_currency.to_string(),
    };

    let mut frame = candles_frame(dp, pair, timeframe)?;
    let startup = strategy.profile().startup_candle_count;
    if frame.len() < startup {
        tracing::debug!(pair, candles = frame.len(), startup, "Analyzing before the warm-up period is complete.");
    }

    for spec in strategy.informative_pairs() {
        let informative_pair = spec.pair(stake_currency);
        let informative = candles_frame(dp, &informative_pair.0, spec.timeframe)?;
        let informative = strategy.populate_informative(&spec, informative, &metadata)?;
        frame = merge_informative(frame, &informative, &spec, timeframe, stake_currency)?;
    }

    let frame = strategy.populate_indicators(frame, &metadata)?;
    let frame = strategy.populate_entry_trend(frame, &metadata)?;
    strategy.populate_exit_trend(frame, &metadata)
}

/// Analyzes `pair`, stores the frame for the stoploss callback and returns
/// the decision on the latest candle.
pub fn analyze_pair(
    strategy: &dyn Strategy,
    dp: &mut MemoryDataProvider,
    pair: &str,
    stake_currency: &str,
) -> Result<Signal> {
    let frame = analyze_frame(strategy, &*dp, pair, stake_currency)?;
    let signal = frame.latest_signal();
    tracing::info!(
        strategy = strategy.name(),
        pair,
        candles = frame.len(),
        ?signal,
        "Pair analyzed."
    );
    dp.store_analyzed(pair, strategy.profile().timeframe, frame);
    Ok(signal)
}
