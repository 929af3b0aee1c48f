// In crates/strategies/src/factory.rs

use anyhow::{Context, Result};
use crate::{breakout::BreakoutStrategy, pair_breakout::PairBreakoutStrategy, Strategy};
use crate::types::{BreakoutSettings, PairBreakoutSettings};
use core_types::StrategyConfig;

/// Builds one strategy from its `live.toml` entry.
pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy + Send + Sync>> {
    let strategy: Box<dyn Strategy + Send + Sync> = match config.name.as_str() {
        "breakout" => {
            let settings: BreakoutSettings = config
                .params
                .clone()
                .try_into()
                .with_context(|| format!("Invalid params for strategy '{}'", config.name))?;
            Box::new(BreakoutStrategy::new(settings))
        }
        "pair_breakout" => {
            let settings: PairBreakoutSettings = config
                .params
                .clone()
                .try_into()
                .with_context(|| format!("Invalid params for strategy '{}'", config.name))?;
            Box::new(PairBreakoutStrategy::new(settings))
        }
        unknown => anyhow::bail!("Attempted to create unknown strategy: {}", unknown),
    };
    Ok(strategy)
}

/// Builds every strategy configured for a pair, in order.
pub fn create_strategies_for_live_run(
    pair_strategies: &[StrategyConfig],
) -> Result<Vec<Box<dyn Strategy + Send + Sync>>> {
    pair_strategies.iter().map(create_strategy).collect()
}
