// In crates/app-config/src/lib.rs

use config::{Config, Environment, File};
use core_types::DEFAULT_DATE_FORMAT;
use risk::RiskSettings;
use std::path::Path;

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::{AppSettings, DataSettings, Settings};

/// Loads the application settings from `config/` in the working directory.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new("config"))
}

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Built-in defaults, so the tool runs without any config files.
/// 2. Merges an optional `base.toml` file from `config_dir`.
/// 3. Merges an optional environment-specific file (e.g., `development.toml`).
/// 4. Merges settings from environment variables (e.g., `APP_DATA__DIR=...`).
pub fn load_settings_from(config_dir: &Path) -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let settings = Config::builder()
        .set_default("app.environment", environment.as_str())?
        .set_default("app.log_level", "info")?
        .set_default("app.date_format", DEFAULT_DATE_FORMAT)?
        .set_default("data.dir", "./test_data")?
        .set_default("data.trade_record_file", "trade_record.csv")?
        .set_default("data.risk_config_file", "configs.json")?
        .add_source(File::from(config_dir.join("base")).required(false))
        .add_source(File::from(config_dir.join(&environment)).required(false))
        // The prefix is `APP`, separator is `__`.
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    // Deserialize the configuration into our `Settings` struct.
    let settings: Settings = settings.try_deserialize()?;

    Ok(settings)
}

/// Loads and validates the risk parameters (`capital`, `risk_taking_ratio`).
///
/// The file format follows its extension (`.json` or `.toml`). Values can be
/// overridden with `APP_RISK__CAPITAL` and `APP_RISK__RISK_TAKING_RATIO`.
pub fn load_risk_settings(path: &Path) -> Result<RiskSettings> {
    load_risk_settings_with(path, risk_environment())
}

fn risk_environment() -> Environment {
    Environment::with_prefix("APP_RISK").prefix_separator("__")
}

fn load_risk_settings_with(path: &Path, environment: Environment) -> Result<RiskSettings> {
    if !path.exists() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("risk configuration not found at {}", path.display()),
        )));
    }

    let config = Config::builder()
        .add_source(File::from(path))
        .add_source(environment)
        .build()?;

    let settings: RiskSettings = config.try_deserialize()?;
    settings.validate()?;

    tracing::info!(
        capital = settings.capital,
        risk_taking_ratio = settings.risk_taking_ratio,
        "Risk configuration loaded."
    );
    Ok(settings)
}
