// In crates/app-config/src/lib.rs

use std::path::Path;

use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{LiveConfig, PairConfig, Settings, StrategySettings};

/// Loads the application settings from the `config` directory.
///
/// The environment is read from `APP_ENVIRONMENT`, defaulting to "development".
pub fn load_settings() -> Result<Settings> {
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());
    load_settings_from(Path::new("config"), &environment)
}

/// Loads settings from `config_dir`.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads from a default `base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `development.toml`).
/// 3. Merges settings from environment variables.
pub fn load_settings_from(config_dir: &Path, environment: &str) -> Result<Settings> {
    let base = config_dir.join("base");
    let overlay = config_dir.join(environment);

    let settings = Config::builder()
        // The environment name is always available, even if no file sets it.
        .set_default("app.environment", environment)?
        .add_source(File::with_name(&base.to_string_lossy()))
        .add_source(File::with_name(&overlay.to_string_lossy()).required(false))
        // Settings from environment variables (e.g., `APP__APP__LOG_LEVEL=debug`).
        // The prefix is `APP`, separator is `__`.
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}

/// Loads the per-pair run configuration from `config/live.toml`.
pub fn load_live_config() -> Result<LiveConfig> {
    load_live_config_from(Path::new("config/live.toml"))
}

pub fn load_live_config_from(path: &Path) -> Result<LiveConfig> {
    let content = std::fs::read_to_string(path)?;

    let config: LiveConfig = toml::from_str(&content)?;
    Ok(config)
}
