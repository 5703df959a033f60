//! Configuration module
//!
//! Handles loading, validating and saving launcher configuration.

mod backup;
mod field;
mod schema;
mod store;
mod validate;

pub use backup::{BackupEntry, MAX_BACKUPS};
pub use field::Field;
pub use schema::{
    Config, NICKNAME_MAX_LEN, ParseThemeError, RAM_MAX, RAM_MIN, Theme, WINDOW_HEIGHT_MAX,
    WINDOW_MIN, WINDOW_WIDTH_MAX,
};
pub use store::{ConfigStore, LoadReport, LoadSource};
pub use validate::{Correction, Validated, sanitize_text, validate, validate_value};

use std::path::PathBuf;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("innlab-launcher")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}
