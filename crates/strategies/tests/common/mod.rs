// In crates/strategies/tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use core_types::{Kline, Symbol, Trade};
use rust_decimal::Decimal;
use strategies::PairMetadata;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

pub const HOUR_MS: i64 = 3_600_000;

fn price(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap()
}

/// Hourly candles with `high = close + spread` and `low = close - spread`.
pub fn klines_from_closes(closes: &[f64], spread: f64) -> Vec<Kline> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Kline {
            open_time: i as i64 * HOUR_MS,
            open: price(close),
            high: price(close + spread),
            low: price(close - spread),
            close: price(close),
            volume: Decimal::ONE_HUNDRED,
        })
        .collect()
}

/// Hourly candles from explicit `(high, low, close)` triples.
pub fn klines_from_hlc(rows: &[(f64, f64, f64)]) -> Vec<Kline> {
    rows.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Kline {
            open_time: i as i64 * HOUR_MS,
            open: price(close),
            high: price(high),
            low: price(low),
            close: price(close),
            volume: Decimal::ONE_HUNDRED,
        })
        .collect()
}

pub fn metadata(pair: &str) -> PairMetadata {
    PairMetadata { pair: Symbol::from(pair), stake_currency: "USDT".to_string() }
}

pub fn trade(pair: &str, is_short: bool) -> Trade {
    Trade {
        pair: pair.to_string(),
        is_short,
        open_rate: 100.0,
        open_date: Utc.timestamp_millis_opt(0).unwrap(),
        amount: 1.0,
    }
}

/// One event seen by `CaptureLayer`.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    /// Rendered fields, `name=value` separated by spaces.
    pub text: String,
    /// Names of the spans the event was recorded in, outermost first.
    pub spans: Vec<String>,
}

/// Collects every event it sees together with its span scope.
#[derive(Clone, Default)]
pub struct CaptureLayer {
    pub events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.level == level)
            .cloned()
            .collect()
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let spans = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name().to_string()).collect())
            .unwrap_or_default();
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            text: visitor.text,
            spans,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    text: String,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(&format!("{}={:?}", field.name(), value));
    }
}
