//! Utility module
//!
//! Common utilities used across the application.

pub mod fs;
pub mod hash;

use std::path::PathBuf;

/// Get the data directory for the launcher
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("innlab-launcher")
}
