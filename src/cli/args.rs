//! CLI argument definitions
//!
//! Uses clap derive macros for argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// InnLab Launcher - settings and setup for the modpack launcher
#[derive(Parser, Debug)]
#[command(name = "innlab")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Use this configuration file instead of the platform default
    #[arg(long, global = true, env = "INNLAB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create launcher directories and a default configuration
    Init,

    /// Inspect or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage configuration backups
    Backups {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the validated configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Print a single field
    Get {
        /// Field name (e.g. ram, nickname, theme)
        field: String,
    },
    /// Change a single field and save
    Set {
        /// Field name (e.g. ram, nickname, theme)
        field: String,
        /// New value
        value: String,
    },
    /// Restore default settings
    Reset,
    /// Open the configuration folder in the file manager
    Open,
}

#[derive(Subcommand, Debug)]
pub enum BackupAction {
    /// List retained backups, newest first
    List,
    /// Make a backup the live configuration
    Restore {
        /// Backup file name as shown by `backups list`
        name: String,
    },
}
