// In crates/strategies/src/informative.rs

//! Merging an auxiliary instrument's candles onto the traded pair's frame.

use core_types::{Symbol, Timeframe};

use crate::frame::DataFrame;
use crate::{Error, Result};

/// Declares an auxiliary series a strategy needs next to the traded pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformativeSpec {
    /// Pair to fetch, may contain `{stake}`.
    pub asset: String,
    pub timeframe: Timeframe,
    /// Name template for merged columns. Accepts `{base}`, `{BASE}`, `{quote}`,
    /// `{QUOTE}`, `{column}` and `{timeframe}`.
    pub fmt: String,
}

impl InformativeSpec {
    pub fn new(asset: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            asset: asset.into(),
            timeframe,
            fmt: "{base}_{column}_{timeframe}".to_string(),
        }
    }

    pub fn with_fmt(mut self, fmt: impl Into<String>) -> Self {
        self.fmt = fmt.into();
        self
    }

    /// The concrete pair, with `{stake}` replaced.
    pub fn pair(&self, stake_currency: &str) -> Symbol {
        Symbol(self.asset.replace("{stake}", stake_currency))
    }

    /// Name a column of the informative frame takes once merged.
    pub fn column_name(&self, stake_currency: &str, column: &str) -> String {
        let pair = self.pair(stake_currency);
        let base = pair.base();
        let quote = pair.quote().unwrap_or(stake_currency);
        self.fmt
            .replace("{base}", &base.to_lowercase())
            .replace("{BASE}", &base.to_uppercase())
            .replace("{quote}", &quote.to_lowercase())
            .replace("{QUOTE}", &quote.to_uppercase())
            .replace("{column}", column)
            .replace("{timeframe}", &self.timeframe.to_string())
    }
}

/// Left-joins `informative` onto `primary` by candle time.
///
/// An informative candle only becomes visible once it has closed relative to
/// the primary timeframe, i.e. at `open_time + informative_tf - base_tf`. Each
/// primary row takes the most recent visible informative row; rows before the
/// first visible one get `None`. A `date` column carrying the informative
/// candle's open time is merged along with the others.
pub fn merge_informative(
    mut primary: DataFrame,
    informative: &DataFrame,
    spec: &InformativeSpec,
    base_timeframe: Timeframe,
    stake_currency: &str,
) -> Result<DataFrame> {
    if spec.timeframe.millis() < base_timeframe.millis() {
        return Err(Error::FasterInformative {
            informative: spec.timeframe.to_string(),
            base: base_timeframe.to_string(),
        });
    }
    let delay = spec.timeframe.millis() - base_timeframe.millis();

    // Row of `informative` visible at each primary row.
    let informative_times = informative.open_time();
    let mut source_rows = Vec::with_capacity(primary.len());
    let mut next = 0;
    let mut current = None;
    for time in primary.open_time() {
        while next < informative_times.len() && informative_times[next] + delay <= time {
            current = Some(next);
            next += 1;
        }
        source_rows.push(current);
    }

    let pick = |values: &[Option<f64>]| -> Vec<Option<f64>> {
        source_rows.iter().map(|row| row.and_then(|r| values[r])).collect()
    };

    let dates: Vec<Option<f64>> = informative_times.iter().map(|t| Some(*t as f64)).collect();
    primary.set_column(spec.column_name(stake_currency, "date"), pick(&dates))?;
    for name in informative.column_names() {
        let merged = pick(&informative.column(name)?);
        primary.set_column(spec.column_name(stake_currency, name), merged)?;
    }

    tracing::debug!(
        pair = %spec.pair(stake_currency),
        timeframe = %spec.timeframe,
        matched = source_rows.iter().filter(|r| r.is_some()).count(),
        rows = source_rows.len(),
        "Merged informative candles."
    );
    Ok(primary)
}
