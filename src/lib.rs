//! InnLab Launcher library root
//!
//! The configuration store and launcher layout, used by the CLI and launcher front ends.

pub mod config;
pub mod error;
pub mod launcher;
pub mod util;

pub use config::{Config, ConfigStore};
pub use error::StoreError;
