// In crates/app-config/src/types.rs

use core_types::DateFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Where the trade records and risk configuration live.
    pub data: DataSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
    /// `chrono` format for dates in records, arguments and reports.
    pub date_format: DateFormat,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub trade_record_file: String,
    pub risk_config_file: String,
}

impl DataSettings {
    pub fn trade_record_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.trade_record_file)
    }

    pub fn risk_config_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.risk_config_file)
    }
}
