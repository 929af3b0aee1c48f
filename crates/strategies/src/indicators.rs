// In crates/strategies/src/indicators.rs

//! Trailing window aggregates over frame columns.
//!
//! Every function here returns one value per input row. Rows without a full
//! window behind them are `None`, as is any window that contains a `None`.

use ta::indicators::{Maximum, Minimum};
use ta::Next;

use crate::{Error, Result};

/// Trailing maximum over `window` rows, inclusive of the current row.
pub fn rolling_max(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    let mut max = Maximum::new(window).map_err(|_| Error::InvalidWindow(window))?;
    // The placeholder never wins a comparison, and windows holding it are masked anyway.
    Ok(rolling(values, window, |v| max.next(v.unwrap_or(f64::NEG_INFINITY))))
}

/// Trailing minimum over `window` rows, inclusive of the current row.
pub fn rolling_min(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    let mut min = Minimum::new(window).map_err(|_| Error::InvalidWindow(window))?;
    Ok(rolling(values, window, |v| min.next(v.unwrap_or(f64::INFINITY))))
}

fn rolling<F>(values: &[Option<f64>], window: usize, mut step: F) -> Vec<Option<f64>>
where
    F: FnMut(Option<f64>) -> f64,
{
    let mut last_gap: Option<usize> = None;
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            if value.is_none() {
                last_gap = Some(i);
            }
            let aggregate = step(*value);
            let warmed_up = i + 1 >= window;
            let gap_in_window = last_gap.is_some_and(|gap| gap + window > i);
            (warmed_up && !gap_in_window).then_some(aggregate)
        })
        .collect()
}

/// Lags a column by `periods` rows. The first `periods` rows become `None`.
pub fn shift(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let lead = periods.min(values.len());
    std::iter::repeat_n(None, lead)
        .chain(values[..values.len() - lead].iter().copied())
        .collect()
}

/// `a > b`, false when either side has no value.
pub fn crossed_above(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

/// `a < b`, false when either side has no value.
pub fn crossed_below(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}
