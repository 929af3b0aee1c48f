// In crates/strategies/tests/pair_breakout.rs

mod common;

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use common::{CaptureLayer, klines_from_closes, klines_from_hlc, metadata, trade};
use core_types::{Signal, Timeframe, Trade};
use strategies::pair_breakout::PairBreakoutStrategy;
use strategies::pipeline::{analyze_frame, analyze_pair};
use strategies::{DataFrame, Error, MemoryDataProvider, SignalColumn, StoplossContext, Strategy};
use tracing::Level;
use tracing_subscriber::prelude::*;

const PAIR: &str = "ETH/USDT";
const REFERENCE: &str = "BTC/USDT";

fn ctx<'a>(trade: &'a Trade, current_rate: f64, after_fill: bool) -> StoplossContext<'a> {
    StoplossContext {
        pair: PAIR,
        trade,
        current_time: Utc.timestamp_millis_opt(0).unwrap(),
        current_rate,
        current_profit: 0.0,
        after_fill,
    }
}

/// ETH drifts sideways while BTC rallies on the last candle.
fn provider(btc_closes: &[f64]) -> MemoryDataProvider {
    let eth: Vec<f64> = (0..btc_closes.len()).map(|i| 2000.0 + (i % 4) as f64 * 5.0).collect();
    let mut dp = MemoryDataProvider::new();
    dp.insert_candles(PAIR, Timeframe::ONE_HOUR, klines_from_closes(&eth, 2.0));
    dp.insert_candles(REFERENCE, Timeframe::ONE_HOUR, klines_from_closes(btc_closes, 10.0));
    dp
}

fn rally(len: usize) -> Vec<f64> {
    let mut closes: Vec<f64> = (0..len - 1).map(|i| 30_000.0 + (i % 5) as f64 * 20.0).collect();
    closes.push(31_000.0);
    closes
}

#[test]
fn reference_breakout_triggers_a_long_entry() {
    let strategy = PairBreakoutStrategy::default();
    let mut dp = provider(&rally(30));

    let signal = analyze_pair(&strategy, &mut dp, PAIR, "USDT").unwrap();
    assert_eq!(signal, Signal::EnterLong);

    let frame = analyze_frame(&strategy, &dp, PAIR, "USDT").unwrap();
    for column in ["btc_close_1h", "btc_high_20_1h", "btc_low_20_1h", "btc_date_1h", "low_3", "high_3"] {
        assert!(frame.has_column(column), "missing {column}");
    }

    let close = frame.column("btc_close_1h").unwrap();
    let high_20 = frame.column("btc_high_20_1h").unwrap();
    let enter_long = frame.signal(SignalColumn::EnterLong).unwrap();
    for t in 1..frame.len() {
        let expected = matches!((close[t], high_20[t - 1]), (Some(c), Some(h)) if c > h);
        assert_eq!(enter_long[t], expected, "enter_long at {t}");
    }
    // The reference channel is only defined from the 20th candle on.
    assert!(enter_long[..20].iter().all(|f| !f));
}

#[test]
fn never_enters_short_and_never_exits() {
    let strategy = PairBreakoutStrategy::default();
    // A crashing reference asset must not produce short entries on a spot market.
    let crash: Vec<f64> = (0..40).map(|i| 40_000.0 - i as f64 * 300.0).collect();
    let dp = provider(&crash);

    let frame = analyze_frame(&strategy, &dp, PAIR, "USDT").unwrap();
    for column in [SignalColumn::EnterShort, SignalColumn::ExitLong, SignalColumn::ExitShort] {
        assert!(frame.signal(column).unwrap().iter().all(|f| !f), "{column:?}");
    }
    assert_eq!(frame.latest_signal(), Signal::Hold);
}

#[test]
fn missing_reference_series_fails_the_analysis() {
    let strategy = PairBreakoutStrategy::default();
    let mut dp = MemoryDataProvider::new();
    dp.insert_candles(PAIR, Timeframe::ONE_HOUR, klines_from_closes(&[1.0, 2.0, 3.0], 0.1));

    let err = analyze_frame(&strategy, &dp, PAIR, "USDT").unwrap_err();
    assert_eq!(
        err,
        Error::MissingData { kind: "candle", pair: REFERENCE.into(), timeframe: "1h".into() }
    );
}

#[test]
fn entries_require_the_merged_columns() {
    let strategy = PairBreakoutStrategy::default();
    let frame = DataFrame::from_klines(&klines_from_closes(&[1.0, 2.0, 3.0], 0.1)).unwrap();
    let err = strategy.populate_entry_trend(frame, &metadata(PAIR)).unwrap_err();
    assert_eq!(err, Error::MissingColumn("btc_close_1h".into()));
}

fn stop_provider(rows: &[(f64, f64, f64)]) -> MemoryDataProvider {
    let strategy = PairBreakoutStrategy::default();
    let frame = DataFrame::from_klines(&klines_from_hlc(rows)).unwrap();
    let mut frame = strategy.populate_indicators(frame, &metadata(PAIR)).unwrap();
    // Stand-in for a stale precomputed column, distinct from the raw lows.
    let stale = vec![Some(1.0); frame.len()];
    frame.set_column("low_3", stale).unwrap();

    let mut dp = MemoryDataProvider::new();
    dp.store_analyzed(PAIR, Timeframe::ONE_HOUR, frame);
    dp
}

#[test]
fn after_fill_uses_the_raw_lows_of_the_last_three_candles() {
    let strategy = PairBreakoutStrategy::default();
    let rows = [
        (105.0, 90.0, 100.0),
        (106.0, 97.0, 101.0),
        (107.0, 95.0, 102.0),
        (108.0, 99.0, 103.0),
    ];
    let dp = stop_provider(&rows);
    let long = trade(PAIR, false);

    let stop = strategy.custom_stoploss(&dp, &ctx(&long, 100.0, true)).unwrap();
    // min(97, 95, 99), not the 90 four candles back nor the stored column.
    assert_relative_eq!(stop, -0.05);
}

#[test]
fn routine_updates_use_the_precomputed_column() {
    let strategy = PairBreakoutStrategy::default();
    let rows = [(105.0, 90.0, 100.0), (106.0, 97.0, 101.0), (107.0, 95.0, 102.0)];
    let dp = stop_provider(&rows);
    let long = trade(PAIR, false);

    let stop = strategy.custom_stoploss(&dp, &ctx(&long, 100.0, false)).unwrap();
    assert_relative_eq!(stop, (1.0 - 100.0) / 100.0);
}

#[test]
fn stop_is_converted_as_a_long_even_for_short_trades() {
    let strategy = PairBreakoutStrategy::default();
    let rows = [(105.0, 96.0, 100.0), (106.0, 97.0, 101.0), (107.0, 95.0, 102.0)];
    let frame = DataFrame::from_klines(&klines_from_hlc(&rows)).unwrap();
    let frame = strategy.populate_indicators(frame, &metadata(PAIR)).unwrap();
    let mut dp = MemoryDataProvider::new();
    dp.store_analyzed(PAIR, Timeframe::ONE_HOUR, frame);

    let short = trade(PAIR, true);
    let stop = strategy.custom_stoploss(&dp, &ctx(&short, 100.0, false)).unwrap();
    assert_relative_eq!(stop, -0.05);
}

#[test]
fn short_or_missing_history_is_an_error() {
    let strategy = PairBreakoutStrategy::default();
    let long = trade(PAIR, false);

    let empty = MemoryDataProvider::new();
    let err = strategy.custom_stoploss(&empty, &ctx(&long, 100.0, false)).unwrap_err();
    assert!(matches!(err, Error::MissingData { kind: "analyzed", .. }));

    let rows = [(105.0, 96.0, 100.0), (106.0, 97.0, 101.0)];
    let frame = DataFrame::from_klines(&klines_from_hlc(&rows)).unwrap();
    let frame = strategy.populate_indicators(frame, &metadata(PAIR)).unwrap();
    let mut dp = MemoryDataProvider::new();
    dp.store_analyzed(PAIR, Timeframe::ONE_HOUR, frame);

    let err = strategy.custom_stoploss(&dp, &ctx(&long, 100.0, true)).unwrap_err();
    assert_eq!(err, Error::InsufficientData { required: 3, available: 2 });
    let err = strategy.custom_stoploss(&dp, &ctx(&long, 100.0, false)).unwrap_err();
    assert_eq!(err, Error::UndefinedValue { column: "low_3".into(), row: 1 });
}

#[test]
fn reference_indicators_are_logged_under_the_injected_span() {
    let capture = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, || {
        let strategy = PairBreakoutStrategy::default()
            .with_span(tracing::info_span!("btc_follower", pair = PAIR));
        let dp = provider(&rally(25));
        analyze_frame(&strategy, &dp, PAIR, "USDT").unwrap();
    });

    let populated: Vec<_> = capture
        .at(Level::DEBUG)
        .into_iter()
        .filter(|event| event.text.contains("Reference indicators populated"))
        .collect();
    assert_eq!(populated.len(), 1, "{populated:?}");
    assert_eq!(populated[0].spans, ["btc_follower"]);
    assert!(populated[0].text.contains("BTC/USDT"));
}
