//! Configuration schema
//!
//! Defines the structure of the configuration file and its bounds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Allowed memory allocation for the game, in gigabytes
pub const RAM_MIN: i64 = 2;
pub const RAM_MAX: i64 = 32;

/// Minecraft rejects usernames longer than this
pub const NICKNAME_MAX_LEN: usize = 16;

pub const WINDOW_MIN: i64 = 600;
pub const WINDOW_WIDTH_MAX: i64 = 7680;
pub const WINDOW_HEIGHT_MAX: i64 = 4320;

/// Launcher settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Memory handed to the game (GB)
    pub ram: u32,

    /// Path to a PNG skin (empty = none)
    pub skin: String,

    /// In-game name for offline play
    pub nickname: String,

    /// UI theme
    pub theme: Theme,

    /// Check for modpack updates on startup
    pub auto_update: bool,

    /// Path to Java executable (empty = auto-detect)
    pub java_path: String,

    pub window_width: u32,
    pub window_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ram: default_ram(),
            skin: String::new(),
            nickname: default_nickname(),
            theme: Theme::default(),
            auto_update: true,
            java_path: String::new(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// A theme name other than `dark` or `light`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme \"{0}\" (expected dark or light)")]
pub struct ParseThemeError(pub String);

impl FromStr for Theme {
    type Err = ParseThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(ParseThemeError(s.to_string())),
        }
    }
}

// Default values
pub(crate) fn default_ram() -> u32 {
    4
}
pub(crate) fn default_nickname() -> String {
    "Player".to_string()
}
pub(crate) fn default_window_width() -> u32 {
    1200
}
pub(crate) fn default_window_height() -> u32 {
    800
}
