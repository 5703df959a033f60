//! Error types
//!
//! Only environment failures and programmer errors are surfaced here.
//! Malformed configuration data never becomes an error: the store heals it.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Writing the live configuration file failed
    #[error("could not write configuration to {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying the live file into a backup slot failed
    #[error("could not back up configuration to {path:?}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading a backup requested by name failed
    #[error("could not read backup {path:?}: {source}")]
    ReadBackup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("backup {0:?} is not valid JSON")]
    CorruptBackup(PathBuf),

    #[error("no backup named {0:?}")]
    BackupNotFound(String),

    #[error("unknown configuration field \"{0}\"")]
    UnknownField(String),

    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            StoreError::Persist { source, .. }
            | StoreError::Backup { source, .. }
            | StoreError::ReadBackup { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// The disk (or quota) ran out of space while saving
    pub fn is_storage_full(&self) -> bool {
        matches!(
            self.io_kind(),
            Some(io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded)
        )
    }

    /// The configuration directory is not writable
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self.io_kind(),
            Some(io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem)
        )
    }
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
