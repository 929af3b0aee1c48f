// In crates/strategies/src/stoploss.rs

use crate::Error;

/// Converts an absolute stop price into a stoploss relative to `current_rate`.
///
/// Long: `(stop - rate) / rate`. Short: `(rate - stop) / rate`.
/// `current_rate` must be a positive market price.
pub fn stoploss_from_absolute(stoploss_price: f64, current_rate: f64, is_short: bool) -> f64 {
    if is_short {
        (current_rate - stoploss_price) / current_rate
    } else {
        (stoploss_price - current_rate) / current_rate
    }
}

/// Result of a stoploss callback that never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum StoplossOutcome {
    /// The stop was derived from the analyzed candles.
    Computed(f64),
    /// The stop could not be derived; the configured fallback applies.
    Fallback { value: f64, cause: Error },
}

impl StoplossOutcome {
    /// Resolves a computation into an outcome, substituting `fallback` on error.
    pub fn or_fallback(result: crate::Result<f64>, fallback: f64) -> Self {
        match result {
            Ok(value) => StoplossOutcome::Computed(value),
            Err(cause) => StoplossOutcome::Fallback { value: fallback, cause },
        }
    }

    /// The fraction handed back to the host.
    pub fn value(&self) -> f64 {
        match self {
            StoplossOutcome::Computed(value) => *value,
            StoplossOutcome::Fallback { value, .. } => *value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StoplossOutcome::Fallback { .. })
    }
}
