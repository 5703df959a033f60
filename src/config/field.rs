//! Field names
//!
//! Every key of the configuration document, addressable by name.

use super::schema::Config;
use crate::error::StoreError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ram,
    Skin,
    Nickname,
    Theme,
    AutoUpdate,
    JavaPath,
    WindowWidth,
    WindowHeight,
}

impl Field {
    /// All fields in document order
    pub const ALL: [Field; 8] = [
        Field::Ram,
        Field::Skin,
        Field::Nickname,
        Field::Theme,
        Field::AutoUpdate,
        Field::JavaPath,
        Field::WindowWidth,
        Field::WindowHeight,
    ];

    /// JSON key of this field
    pub fn key(self) -> &'static str {
        match self {
            Field::Ram => "ram",
            Field::Skin => "skin",
            Field::Nickname => "nickname",
            Field::Theme => "theme",
            Field::AutoUpdate => "auto_update",
            Field::JavaPath => "java_path",
            Field::WindowWidth => "window_width",
            Field::WindowHeight => "window_height",
        }
    }

    /// Current value of this field as JSON
    pub fn read(self, config: &Config) -> Value {
        match self {
            Field::Ram => Value::from(config.ram),
            Field::Skin => Value::from(config.skin.as_str()),
            Field::Nickname => Value::from(config.nickname.as_str()),
            Field::Theme => Value::from(config.theme.to_string()),
            Field::AutoUpdate => Value::from(config.auto_update),
            Field::JavaPath => Value::from(config.java_path.as_str()),
            Field::WindowWidth => Value::from(config.window_width),
            Field::WindowHeight => Value::from(config.window_height),
        }
    }

    /// Interpret raw user input (e.g. from the command line) as a value for this field.
    ///
    /// Input that does not look like the field's type is passed through as a
    /// string so validation can report it.
    pub fn parse_input(self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self {
            Field::Ram | Field::WindowWidth | Field::WindowHeight => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::from(n)
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Value::from(f)
                } else {
                    Value::from(raw)
                }
            }
            Field::AutoUpdate => match trimmed.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Value::Bool(true),
                "false" | "no" | "off" | "0" => Value::Bool(false),
                _ => Value::from(raw),
            },
            Field::Skin | Field::Nickname | Field::Theme | Field::JavaPath => Value::from(raw),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| StoreError::UnknownField(s.to_string()))
    }
}
