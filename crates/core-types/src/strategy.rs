// In crates/core-types/src/strategy.rs

use serde::Deserialize;
use toml::Value;

/// One strategy entry of a pair in `live.toml`.
#[derive(Deserialize, Debug, Clone)]
pub struct StrategyConfig {
    pub name: String,
    // This will hold the `params = { ... }` table from the TOML
    #[serde(default = "empty_params")]
    pub params: Value,
}

fn empty_params() -> Value {
    Value::Table(Default::default())
}
