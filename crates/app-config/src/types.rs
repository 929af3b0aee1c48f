// In crates/app-config/src/types.rs

use serde::Deserialize;

use core_types::StrategyConfig;
use strategies::types::{BreakoutSettings, PairBreakoutSettings};

// Define the container for all strategy settings
#[derive(Deserialize, Debug, Default, Clone)]
pub struct StrategySettings {
    // Each strategy has its own optional settings block
    pub breakout: Option<BreakoutSettings>,
    pub pair_breakout: Option<PairBreakoutSettings>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Exchange-side settings the host applies to every pair.
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub strategies: StrategySettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ExchangeSettings {
    /// Quote currency of every traded pair, substituted into `{stake}`.
    #[serde(default = "default_stake_currency")]
    pub stake_currency: String,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self { stake_currency: default_stake_currency() }
    }
}

// --- Structs for live.toml Configuration ---

/// The top-level configuration for a live or dry run.
#[derive(Deserialize, Debug, Clone)]
pub struct LiveConfig {
    #[serde(rename = "pairs")]
    pub pair_configs: Vec<PairConfig>,
}

impl LiveConfig {
    pub fn enabled_pairs(&self) -> impl Iterator<Item = &PairConfig> {
        self.pair_configs.iter().filter(|p| p.enabled)
    }
}

/// Configuration for a single trading pair.
#[derive(Deserialize, Debug, Clone)]
pub struct PairConfig {
    pub symbol: String,
    pub interval: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub strategies: Vec<StrategyConfig>,
}

/// Helper functions for serde defaults
fn default_enabled() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_stake_currency() -> String { "USDT".to_string() }
