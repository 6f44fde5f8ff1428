//! User settings for Stride
//!
//! Manages user preferences: who the default goal owner is, which currency
//! new goals use, and how listings are paged.

use serde::{Deserialize, Serialize};

use super::paths::StridePaths;
use crate::error::StrideError;

/// User settings for Stride
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Owner id used when the CLI is not given `--user`
    #[serde(default = "default_user")]
    pub default_user: String,

    /// ISO currency code stamped on new goals
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Currency symbol used for display
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Goals per page when listing
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_schema_version() -> u32 {
    1
}

fn default_user() -> String {
    "default".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_page_size() -> usize {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_user: default_user(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
            page_size: default_page_size(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &StridePaths) -> Result<Self, StrideError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| StrideError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                StrideError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &StridePaths) -> Result<(), StrideError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| StrideError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| StrideError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
