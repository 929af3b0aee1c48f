// In crates/strategies/src/lib.rs

use chrono::{DateTime, Utc};
use core_types::{Symbol, Trade};

pub mod breakout;
pub mod error;
pub mod factory;
pub mod frame;
pub mod indicators;
pub mod informative;
pub mod pair_breakout;
pub mod pipeline;
pub mod provider;
pub mod stoploss;
pub mod types;

pub use error::{Error, Result};
pub use frame::{DataFrame, SignalColumn};
pub use informative::InformativeSpec;
pub use provider::{DataProvider, MemoryDataProvider};
pub use types::StrategyProfile;

/// Identifies the pair a populate callback is working on.
#[derive(Debug, Clone)]
pub struct PairMetadata {
    pub pair: Symbol,
    /// Quote currency positions are opened in, substituted into `{stake}`.
    pub stake_currency: String,
}

/// Everything the host hands the stoploss callback besides the data provider.
#[derive(Debug, Clone, Copy)]
pub struct StoplossContext<'a> {
    pub pair: &'a str,
    pub trade: &'a Trade,
    pub current_time: DateTime<Utc>,
    pub current_rate: f64,
    pub current_profit: f64,
    /// `true` right after an entry order filled, `false` on routine re-evaluation.
    pub after_fill: bool,
}

/// The interface a host drives, once per candle for the populate callbacks and
/// on every price update for the stoploss.
///
/// Implementations are stateless between calls: every callback recomputes
/// what it needs from the frame it is given.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Settings the host reads to schedule and constrain this strategy.
    fn profile(&self) -> &StrategyProfile;

    /// Auxiliary series to fetch and merge before `populate_indicators`.
    fn informative_pairs(&self) -> Vec<InformativeSpec> {
        Vec::new()
    }

    /// Derives columns on an informative series before it is merged.
    fn populate_informative(
        &self,
        _spec: &InformativeSpec,
        frame: DataFrame,
        _metadata: &PairMetadata,
    ) -> Result<DataFrame> {
        Ok(frame)
    }

    fn populate_indicators(&self, frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame>;

    fn populate_entry_trend(&self, frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame>;

    fn populate_exit_trend(&self, frame: DataFrame, metadata: &PairMetadata) -> Result<DataFrame>;

    /// Stoploss relative to `current_rate`, derived from the pair's analyzed frame.
    fn custom_stoploss(&self, dp: &dyn DataProvider, ctx: &StoplossContext<'_>) -> Result<f64>;
}
