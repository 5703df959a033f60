//! Configuration backups
//!
//! Before every save the live file is copied into a timestamped slot next to
//! it (`config.20260101T120000.000000.bak.json`). Only the newest
//! [`MAX_BACKUPS`] slots are kept.

use crate::error::{Result, StoreError};
use crate::util;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use std::path::{Path, PathBuf};

/// Number of backup slots retained per config file
pub const MAX_BACKUPS: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.6f";
const SUFFIX: &str = ".bak.json";

/// A retained backup slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub name: String,
    pub path: PathBuf,
    pub created: NaiveDateTime,
}

/// Rotating set of backups for one config file
#[derive(Debug, Clone)]
pub struct BackupRotation {
    dir: PathBuf,
    prefix: String,
    keep: usize,
}

impl BackupRotation {
    /// Backups stored alongside `config_path`
    pub fn for_config(config_path: &Path, keep: usize) -> Self {
        let dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = config_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());

        Self {
            dir,
            prefix: format!("{stem}."),
            keep: keep.max(1),
        }
    }

    fn parse_name(&self, name: &str) -> Option<NaiveDateTime> {
        let stamp = name.strip_prefix(&self.prefix)?.strip_suffix(SUFFIX)?;
        NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
    }

    fn slot_name(&self, created: NaiveDateTime) -> String {
        format!("{}{}{}", self.prefix, created.format(TIMESTAMP_FORMAT), SUFFIX)
    }

    /// All backups, newest first
    pub fn list(&self) -> Result<Vec<BackupEntry>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Backup {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut backups: Vec<BackupEntry> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                let created = self.parse_name(&name)?;
                Some(BackupEntry {
                    path: entry.path(),
                    name,
                    created,
                })
            })
            .collect();

        backups.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(backups)
    }

    pub fn latest(&self) -> Result<Option<BackupEntry>> {
        Ok(self.list()?.into_iter().next())
    }

    pub fn find(&self, name: &str) -> Result<Option<BackupEntry>> {
        Ok(self.list()?.into_iter().find(|entry| entry.name == name))
    }

    /// Copy `source` into a new slot and evict the oldest slots beyond the limit.
    ///
    /// Returns `None` when there is nothing to back up, or when `source` is
    /// identical to the newest backup.
    pub fn create(&self, source: &Path) -> Result<Option<PathBuf>> {
        let contents = match std::fs::read(source) {
            Ok(contents) => contents,
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
                ) =>
            {
                return Ok(None);
            }
            Err(source_err) => {
                return Err(StoreError::Backup {
                    path: source.to_path_buf(),
                    source: source_err,
                });
            }
        };

        let latest = self.latest()?;
        if let Some(latest) = &latest {
            if util::hash::same_contents(source, &latest.path).unwrap_or(false) {
                tracing::debug!(backup = %latest.name, "Config unchanged since last backup");
                return Ok(None);
            }
        }

        // Slots must sort strictly after the newest one even if the clock
        // has not advanced (or went backwards)
        let mut created = Utc::now().naive_utc();
        if let Some(latest) = &latest {
            if created <= latest.created {
                created = latest.created + TimeDelta::microseconds(1);
            }
        }

        let path = self.dir.join(self.slot_name(created));
        util::fs::write_atomic(&path, &contents).map_err(|source| StoreError::Backup {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(backup = %path.display(), "Config backup created");

        self.prune()?;
        Ok(Some(path))
    }

    /// Delete backups beyond the retention limit, oldest first
    pub fn prune(&self) -> Result<usize> {
        let stale: Vec<BackupEntry> = self.list()?.into_iter().skip(self.keep).collect();

        for entry in &stale {
            std::fs::remove_file(&entry.path).map_err(|source| StoreError::Backup {
                path: entry.path.clone(),
                source,
            })?;
            tracing::debug!(backup = %entry.name, "Evicted old config backup");
        }

        Ok(stale.len())
    }
}
