//! Configuration validation
//!
//! Invalid values are repaired rather than rejected: numbers are clamped,
//! unknown enum values fall back to their default, and strings are
//! sanitized. Every repair is reported as a [`Correction`].

use super::field::Field;
use super::schema::{self, Config, Theme};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Characters that are unsafe in a file name on any supported platform
const NICKNAME_FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A single repair made during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub field: String,
    pub reason: String,
}

impl Correction {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Result of validating a document
#[derive(Debug, Clone)]
pub struct Validated {
    pub config: Config,
    pub corrections: Vec<Correction>,
}

impl Validated {
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty()
    }
}

/// Validate a typed document
pub fn validate(config: &Config) -> Validated {
    let mut out = Config::default();
    let corrections = Field::ALL
        .into_iter()
        .filter_map(|field| apply_field(&mut out, field, &field.read(config)))
        .collect();

    Validated {
        config: out,
        corrections,
    }
}

/// Validate a raw JSON document as read from disk
///
/// Missing fields take their default, unknown keys are dropped.
pub fn validate_value(value: &Value) -> Validated {
    let Some(object) = value.as_object() else {
        return Validated {
            config: Config::default(),
            corrections: vec![Correction::new(
                "document",
                "not a JSON object, using defaults",
            )],
        };
    };

    let mut out = Config::default();
    let mut corrections = Vec::new();

    for field in Field::ALL {
        match object.get(field.key()) {
            Some(value) => corrections.extend(apply_field(&mut out, field, value)),
            None => corrections.push(Correction::new(field.key(), "missing, using default")),
        }
    }

    corrections.extend(unknown_keys(object).map(|key| Correction::new(key, "unknown field dropped")));

    Validated {
        config: out,
        corrections,
    }
}

fn unknown_keys(object: &Map<String, Value>) -> impl Iterator<Item = &str> {
    object
        .keys()
        .map(String::as_str)
        .filter(|key| key.parse::<Field>().is_err())
}

/// Validate `value` for `field` and store the repaired value into `config`
pub(crate) fn apply_field(config: &mut Config, field: Field, value: &Value) -> Option<Correction> {
    let reason = match field {
        Field::Ram => {
            let (ram, reason) =
                clamp_integer(value, schema::RAM_MIN, schema::RAM_MAX, schema::default_ram());
            config.ram = ram;
            reason
        }
        Field::WindowWidth => {
            let (width, reason) = clamp_integer(
                value,
                schema::WINDOW_MIN,
                schema::WINDOW_WIDTH_MAX,
                schema::default_window_width(),
            );
            config.window_width = width;
            reason
        }
        Field::WindowHeight => {
            let (height, reason) = clamp_integer(
                value,
                schema::WINDOW_MIN,
                schema::WINDOW_HEIGHT_MAX,
                schema::default_window_height(),
            );
            config.window_height = height;
            reason
        }
        Field::Theme => match value.as_str().map(str::parse::<Theme>) {
            Some(Ok(theme)) => {
                config.theme = theme;
                None
            }
            _ => {
                config.theme = Theme::default();
                Some(format!("{value} is not a theme, using {}", Theme::default()))
            }
        },
        Field::AutoUpdate => match value.as_bool() {
            Some(flag) => {
                config.auto_update = flag;
                None
            }
            None => {
                config.auto_update = true;
                Some("expected a boolean, using true".to_string())
            }
        },
        Field::Nickname => {
            let (nickname, reason) = check_nickname(value);
            config.nickname = nickname;
            reason
        }
        Field::Skin => {
            let (skin, reason) = check_path(value, is_png_file, "a readable PNG image");
            config.skin = skin;
            reason
        }
        Field::JavaPath => {
            let (java, reason) = check_path(value, is_executable, "an executable file");
            config.java_path = java;
            reason
        }
    };

    reason.map(|reason| Correction::new(field.key(), reason))
}

fn as_integer(value: &Value) -> Option<(i64, bool)> {
    if let Some(n) = value.as_i64() {
        return Some((n, false));
    }
    // Floats and out-of-range integers; `as` saturates
    value.as_f64().map(|f| (f.trunc() as i64, f.fract() != 0.0))
}

fn clamp_integer(value: &Value, min: i64, max: i64, default: u32) -> (u32, Option<String>) {
    let Some((n, truncated)) = as_integer(value) else {
        return (default, Some(format!("expected an integer, using {default}")));
    };

    let clamped = n.clamp(min, max);
    let reason = if clamped != n {
        Some(format!("{value} out of range {min}..={max}, clamped to {clamped}"))
    } else if truncated {
        Some(format!("{value} is not a whole number, using {clamped}"))
    } else {
        None
    };

    // Bounds are all within u32
    (u32::try_from(clamped).unwrap_or(default), reason)
}

/// Strip control characters and `..` sequences
pub fn sanitize_text(input: &str) -> String {
    let mut out: String = input.chars().filter(|c| !c.is_control()).collect();
    while out.contains("..") {
        out = out.replace("..", "");
    }
    out
}

fn check_nickname(value: &Value) -> (String, Option<String>) {
    let Some(raw) = value.as_str() else {
        return (
            schema::default_nickname(),
            Some("expected a string, using default".to_string()),
        );
    };

    let allowed: String = raw
        .chars()
        .filter(|c| !NICKNAME_FORBIDDEN.contains(c))
        .collect();
    let cleaned = sanitize_text(&allowed);
    let mut nickname = cleaned.trim().to_string();
    if nickname.chars().count() > schema::NICKNAME_MAX_LEN {
        nickname = nickname.chars().take(schema::NICKNAME_MAX_LEN).collect();
        nickname.truncate(nickname.trim_end().len());
    }

    if nickname.is_empty() {
        return (
            schema::default_nickname(),
            Some("empty after sanitizing, using default".to_string()),
        );
    }

    // Surrounding whitespace is not worth reporting
    let reason = (nickname != raw.trim()).then(|| format!("sanitized to {nickname:?}"));
    (nickname, reason)
}

fn check_path(
    value: &Value,
    accept: fn(&Path) -> bool,
    expected: &str,
) -> (String, Option<String>) {
    let Some(raw) = value.as_str() else {
        return (String::new(), Some("expected a string, cleared".to_string()));
    };

    if sanitize_text(raw) != raw {
        return (
            String::new(),
            Some("contains control characters or '..', cleared".to_string()),
        );
    }

    let path = raw.trim();
    if path.is_empty() {
        let reason = (!raw.is_empty()).then(|| "blank, cleared".to_string());
        return (String::new(), reason);
    }
    if !accept(Path::new(path)) {
        return (String::new(), Some(format!("{path:?} is not {expected}, cleared")));
    }

    let reason = (path != raw).then(|| "surrounding whitespace removed".to_string());
    (path.to_string(), reason)
}

fn is_png_file(path: &Path) -> bool {
    let mut header = [0u8; 8];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map(|()| header == PNG_SIGNATURE)
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
