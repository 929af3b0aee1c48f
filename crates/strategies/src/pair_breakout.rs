// In crates/strategies/src/pair_breakout.rs

//! Long-only breakout driven by a reference asset.
//!
//! The traded pair is entered when the reference asset (BTC by default) closes
//! above its own previous N-bar high. Spot markets only, so there are no short
//! entries. The stop trails the traded pair's 3-bar low.

use tracing::Span;

use crate::frame::{DataFrame, SignalColumn};
use crate::indicators::{crossed_above, rolling_max, rolling_min, shift};
use crate::informative::InformativeSpec;
use crate::stoploss::stoploss_from_absolute;
use crate::types::{MinimalRoi, PairBreakoutSettings, StrategyProfile};
use crate::{DataProvider, Error, PairMetadata, Result, StoplossContext, Strategy};
use core_types::Timeframe;

#[derive(Debug)]
pub struct PairBreakoutStrategy {
    settings: PairBreakoutSettings,
    profile: StrategyProfile,
    informative: InformativeSpec,
    span: Span,
}

impl PairBreakoutStrategy {
    pub const NAME: &'static str = "PairBreakoutStrategy";

    pub fn new(settings: PairBreakoutSettings) -> Self {
        let profile = StrategyProfile {
            timeframe: Timeframe::ONE_HOUR,
            can_short: false,
            use_custom_stoploss: true,
            minimal_roi: MinimalRoi::new([(0, 100.0)]),
            stoploss: -0.99,
            max_open_trades: None,
            process_only_new_candles: true,
            startup_candle_count: settings.breakout_window,
        };
        let informative = InformativeSpec::new(settings.reference_asset.clone(), Timeframe::ONE_HOUR);
        Self {
            settings,
            profile,
            informative,
            span: tracing::info_span!("strategy", strategy = Self::NAME),
        }
    }

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

    fn low_stop(&self) -> String {
        format!("low_{}", self.settings.stop_window)
    }
}

impl Default for PairBreakoutStrategy {
    fn default() -> Self {
        Self::new(PairBreakoutSettings::default())
    }
}

impl Strategy for PairBreakoutStrategy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    fn informative_pairs(&self) -> Vec<InformativeSpec> {
        vec![self.informative.clone()]
    }

    fn populate_informative(
        &self,
        spec: &InformativeSpec,
        mut frame: DataFrame,
        metadata: &PairMetadata,
    ) -> Result<DataFrame> {
        let _entered = self.span.enter();
        let high = frame.column("high")?;
        let low = frame.column("low")?;
        frame.set_column(self.high_channel(), rolling_max(&high, self.settings.breakout_window)?)?;
        frame.set_column(self.low_channel(), rolling_min(&low, self.settings.breakout_window)?)?;

        tracing::debug!(
            pair = %spec.pair(&metadata.stake_currency),
            columns = ?frame.column_names().collect::<Vec<_>>(),
            "Reference indicators populated."
        );
        Ok(frame)
    }

    fn populate_indicators(&self, mut frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame> {
        let _entered = self.span.enter();
        let high = frame.column("high")?;
        let low = frame.column("low")?;
        let stop_window = self.settings.stop_window;
        frame.set_column(self.low_stop(), rolling_min(&low, stop_window)?)?;
        frame.set_column(format!("high_{stop_window}"), rolling_max(&high, stop_window)?)?;

        tracing::debug!(
            pair = %metadata.pair,
            columns = ?frame.column_names().collect::<Vec<_>>(),
            "Indicators populated."
        );
        Ok(frame)
    }

    fn populate_entry_trend(&self, mut frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame> {
        let _entered = self.span.enter();
        let stake = &metadata.stake_currency;
        let reference_close = frame.column(&self.informative.column_name(stake, "close"))?;
        let reference_high =
            frame.column(&self.informative.column_name(stake, &self.high_channel()))?;
        let prev_high = shift(&reference_high, 1);

        let enter_long: Vec<bool> = reference_close
            .iter()
            .zip(&prev_high)
            .map(|(c, h)| crossed_above(*c, *h))
            .collect();

        frame.set_signal(SignalColumn::EnterLong, enter_long)?;
        frame.clear_signal(SignalColumn::EnterShort)?;
        Ok(frame)
    }

    fn populate_exit_trend(&self, mut frame: DataFrame, _metadata: &PairMetadata) -> Result<DataFrame> {
        frame.clear_signal(SignalColumn::ExitLong)?;
        frame.clear_signal(SignalColumn::ExitShort)?;
        Ok(frame)
    }

    /// Errors are returned to the caller as-is; there is no fallback here.
    fn custom_stoploss(&self, dp: &dyn DataProvider, ctx: &StoplossContext<'_>) -> Result<f64> {
        let _entered = self.span.enter();
        let frame = dp
            .analyzed_frame(ctx.pair, self.profile.timeframe)
            .ok_or_else(|| Error::MissingData {
                kind: "analyzed",
                pair: ctx.pair.to_string(),
                timeframe: self.profile.timeframe.to_string(),
            })?;

        let stoploss_price = if ctx.after_fill {
            // Fresh from the raw lows rather than the precomputed column.
            frame
                .tail("low", self.settings.stop_window)?
                .into_iter()
                .fold(f64::INFINITY, f64::min)
        } else {
            frame.last_value(&self.low_stop())?
        };

        tracing::trace!(pair = %ctx.pair, stoploss_price, after_fill = ctx.after_fill, "Stop price resolved.");
        Ok(stoploss_from_absolute(stoploss_price, ctx.current_rate, false))
    }
}
