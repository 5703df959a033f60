//! Launcher directory layout
//!
//! First-run setup and the pieces of launcher state derived from the config.

use crate::config::{Config, ConfigStore, Correction, RAM_MIN};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Subdirectories every launcher data dir must have
pub const REQUIRED_DIRS: [&str; 4] = ["minecraft", "modpacks", "cache", "logs"];

/// File name the skin loader mod picks up inside the game directory
const SKIN_FILE: &str = "skin.png";

/// File the CLI appends its log to, inside `logs/`
pub const LOG_FILE: &str = "launcher.log";

/// Upper bound for the first-run RAM suggestion, in GB
const RECOMMENDED_RAM_MAX: i64 = 16;

/// First-run RAM suggestion: half the machine's memory, within 2..=16 GB
pub fn recommended_ram(total_gb: u64) -> u32 {
    let half = i64::try_from(total_gb / 2).unwrap_or(i64::MAX);
    // Clamped into 2..=16, so the cast is lossless
    half.clamp(RAM_MIN, RECOMMENDED_RAM_MAX) as u32
}

/// Installed physical memory in whole GB, if the OS reports it
pub fn system_memory_gb() -> Option<u64> {
    let mut sys = System::new();
    sys.refresh_memory();

    match sys.total_memory() {
        0 => None,
        bytes => Some(bytes / (1024 * 1024 * 1024)),
    }
}

#[derive(Debug, Clone)]
pub struct LauncherDirs {
    root: PathBuf,
}

impl LauncherDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn minecraft_dir(&self) -> PathBuf {
        self.root.join("minecraft")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Writer appending to `logs/launcher.log`, creating `logs/` if needed
    pub fn log_appender(&self) -> Result<RollingFileAppender> {
        let dir = self.logs_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {:?}", dir))?;

        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE)
            .build(&dir)
            .with_context(|| format!("Failed to open log file in {:?}", dir))
    }

    /// Create the data directory and its required subdirectories
    pub fn ensure(&self) -> Result<()> {
        for name in REQUIRED_DIRS {
            let dir = self.root.join(name);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {:?}", dir))?;
            tracing::debug!("Directory ensured: {:?}", dir);
        }
        Ok(())
    }

    /// Copy the configured skin into the game directory.
    ///
    /// Returns the destination, or `None` when no skin is set.
    pub fn install_skin(&self, config: &Config) -> Result<Option<PathBuf>> {
        if config.skin.is_empty() {
            return Ok(None);
        }

        let dest = self.minecraft_dir().join(SKIN_FILE);
        std::fs::create_dir_all(self.minecraft_dir())?;
        std::fs::copy(&config.skin, &dest)
            .with_context(|| format!("Failed to copy skin {:?}", config.skin))?;

        tracing::info!("Skin copied to {:?}", dest);
        Ok(Some(dest))
    }

    /// [`LauncherDirs::install_skin`], logging instead of failing
    pub fn sync_skin(&self, config: &Config) {
        if let Err(e) = self.install_skin(config) {
            tracing::error!("Error copying skin: {:#}", e);
        }
    }
}

impl Default for LauncherDirs {
    fn default() -> Self {
        Self::new(crate::util::data_dir())
    }
}

/// Outcome of [`initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub config_created: bool,
}

/// Persist pending `set`s, then refresh the installed skin
pub fn commit_settings(store: &ConfigStore, dirs: &LauncherDirs) -> Result<Vec<Correction>> {
    let corrections = store.commit().context("Failed to save configuration")?;
    dirs.sync_skin(&store.get());
    Ok(corrections)
}

/// Defaults for a fresh install, with RAM sized to this machine
pub fn first_run_config() -> Config {
    let mut config = Config::default();
    match system_memory_gb() {
        Some(total_gb) => {
            config.ram = recommended_ram(total_gb);
            tracing::info!("Detected {} GB of memory, allocating {} GB", total_gb, config.ram);
        }
        None => tracing::warn!("Could not detect system memory, using default RAM"),
    }
    config
}

/// Prepare a fresh install: data directories plus a default config file
pub fn initialize(dirs: &LauncherDirs, store: &ConfigStore) -> Result<InitReport> {
    tracing::info!("Launcher directory: {:?}", dirs.root());
    dirs.ensure()?;

    let config_created = store
        .create_if_missing(&first_run_config())
        .context("Failed to create default configuration")?;
    if config_created {
        tracing::info!("Default configuration created: {:?}", store.path());
    } else {
        tracing::info!("Configuration file already exists");
    }

    Ok(InitReport { config_created })
}
