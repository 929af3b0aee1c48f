// In crates/strategies/src/breakout.rs

//! Single-symbol channel breakout.
//!
//! - Long entry: close breaks above the previous bar's N-bar high.
//! - Short entry: close breaks below the previous bar's N-bar low.
//! - Exits: none, positions are closed by the trailing stop on the 3-bar extreme.

use tracing::Span;

use crate::frame::{DataFrame, SignalColumn};
use crate::indicators::{crossed_above, crossed_below, rolling_max, rolling_min, shift};
use crate::stoploss::StoplossOutcome;
use crate::types::{BreakoutSettings, MinimalRoi, StrategyProfile};
use crate::{DataProvider, Error, PairMetadata, Result, StoplossContext, Strategy};
use core_types::Timeframe;

#[derive(Debug)]
pub struct BreakoutStrategy {
    settings: BreakoutSettings,
    profile: StrategyProfile,
    span: Span,
}

impl BreakoutStrategy {
    pub const NAME: &'static str = "BreakoutStrategy";

    /// Creates a new `BreakoutStrategy` instance from its settings.
    pub fn new(settings: BreakoutSettings) -> Self {
        let profile = StrategyProfile {
            timeframe: Timeframe::ONE_HOUR,
            can_short: false,
            use_custom_stoploss: true,
            minimal_roi: MinimalRoi::new([(0, 100.0)]),
            stoploss: -0.99,
            max_open_trades: Some(1),
            process_only_new_candles: true,
            startup_candle_count: settings.breakout_window,
        };
        Self {
            settings,
            profile,
            span: tracing::info_span!("strategy", strategy = Self::NAME),
        }
    }

    /// Replaces the span the strategy logs under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    fn high_channel(&self) -> String {
        format!("high_{}", self.settings.breakout_window)
    }

    fn low_channel(&self) -> String {
        format!("low_{}", self.settings.breakout_window)
    }

    fn high_stop(&self) -> String {
        format!("high_{}", self.settings.stop_window)
    }

    fn low_stop(&self) -> String {
        format!("low_{}", self.settings.stop_window)
    }

    /// Computes the trailing stop, falling back to `fallback_stoploss` whenever
    /// it cannot be derived. Never fails.
    pub fn stoploss_outcome(&self, dp: &dyn DataProvider, ctx: &StoplossContext<'_>) -> StoplossOutcome {
        let _entered = self.span.enter();
        let outcome = StoplossOutcome::or_fallback(
            self.trailing_stop(dp, ctx),
            self.settings.fallback_stoploss,
        );
        match &outcome {
            StoplossOutcome::Fallback { cause: cause @ Error::InsufficientData { .. }, value } => {
                tracing::debug!(pair = %ctx.pair, %cause, fallback = value, "Not enough candles for a trailing stop.");
            }
            StoplossOutcome::Fallback { cause, value } => {
                tracing::warn!(pair = %ctx.pair, %cause, fallback = value, "Custom stoploss error.");
            }
            StoplossOutcome::Computed(_) => {}
        }
        outcome
    }

    fn trailing_stop(&self, dp: &dyn DataProvider, ctx: &StoplossContext<'_>) -> Result<f64> {
        ctx.trade.validate()?;
        if !ctx.current_rate.is_finite() || ctx.current_rate <= 0.0 {
            return Err(Error::InvalidRate(ctx.current_rate));
        }

        let frame = dp
            .analyzed_frame(ctx.pair, self.profile.timeframe)
            .ok_or_else(|| Error::MissingData {
                kind: "analyzed",
                pair: ctx.pair.to_string(),
                timeframe: self.profile.timeframe.to_string(),
            })?;
        if frame.len() < self.settings.stop_window {
            return Err(Error::InsufficientData {
                required: self.settings.stop_window,
                available: frame.len(),
            });
        }

        // Shorts trail the recent high, longs the recent low.
        let column = if ctx.trade.is_short { self.high_stop() } else { self.low_stop() };
        let stop_price = frame.last_value(&column)?;

        // NOTE: same formula for both sides, unlike `stoploss_from_absolute`.
        // A short's stop above the rate comes out positive.
        let stoploss = (stop_price - ctx.current_rate) / ctx.current_rate;
        if !stoploss.is_finite() {
            return Err(Error::NonFiniteStoploss(stoploss));
        }
        Ok(stoploss)
    }
}

impl Default for BreakoutStrategy {
    fn default() -> Self {
        Self::new(BreakoutSettings::default())
    }
}

impl Strategy for BreakoutStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    fn populate_indicators(&self, mut frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame> {
        let _entered = self.span.enter();
        let high = frame.column("high")?;
        let low = frame.column("low")?;

        frame.set_column(self.high_channel(), rolling_max(&high, self.settings.breakout_window)?)?;
        frame.set_column(self.low_channel(), rolling_min(&low, self.settings.breakout_window)?)?;
        frame.set_column(self.high_stop(), rolling_max(&high, self.settings.stop_window)?)?;
        frame.set_column(self.low_stop(), rolling_min(&low, self.settings.stop_window)?)?;

        tracing::trace!(pair = %metadata.pair, rows = frame.len(), "Indicators populated.");
        Ok(frame)
    }

    fn populate_entry_trend(&self, mut frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame> {
        let _entered = self.span.enter();
        let close = frame.column("close")?;
        let prev_high = shift(&frame.column(&self.high_channel())?, 1);
        let prev_low = shift(&frame.column(&self.low_channel())?, 1);

        let enter_long: Vec<bool> = close
            .iter()
            .zip(&prev_high)
            .map(|(c, h)| crossed_above(*c, *h))
            .collect();
        let enter_short: Vec<bool> = close
            .iter()
            .zip(&prev_low)
            .map(|(c, l)| crossed_below(*c, *l))
            .collect();

        frame.set_signal(SignalColumn::EnterLong, enter_long)?;
        frame.set_signal(SignalColumn::EnterShort, enter_short)?;

        tracing::trace!(pair = %metadata.pair, rows = frame.len(), "Entry trend populated.");
        Ok(frame)
    }

    fn populate_exit_trend(&self, mut frame: DataFrame, _metadata: &PairMetadata) -> Result<DataFrame> {
        // Exits are left to the trailing stop.
        frame.clear_signal(SignalColumn::ExitLong)?;
        frame.clear_signal(SignalColumn::ExitShort)?;
        Ok(frame)
    }

    fn custom_stoploss(&self, dp: &dyn DataProvider, ctx: &StoplossContext<'_>) -> Result<f64> {
        Ok(self.stoploss_outcome(dp, ctx).value())
    }
}
