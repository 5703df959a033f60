//! Configuration store
//!
//! Owns the in-memory settings document and its file on disk. Callers only
//! ever see a validated document: a missing or corrupt file is replaced by
//! the newest readable backup, or by defaults.

use super::backup::{BackupEntry, BackupRotation, MAX_BACKUPS};
use super::field::Field;
use super::schema::Config;
use super::validate::{self, Correction, Validated};
use crate::error::{Result, StoreError};
use crate::util;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

/// Where the document returned by [`ConfigStore::load`] came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    File,
    Backup(PathBuf),
    Defaults,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub source: LoadSource,
    pub corrections: Vec<Correction>,
}

enum ReadOutcome {
    Missing,
    Corrupt(String),
    Parsed(Value),
}

/// Parse a config document; anything but a JSON object is rejected
fn parse_document(bytes: Vec<u8>) -> std::result::Result<Value, String> {
    let text = String::from_utf8(bytes).map_err(|e| format!("not UTF-8: {e}"))?;

    match serde_json::from_str::<Value>(&text) {
        Ok(value) if value.is_object() => Ok(value),
        Ok(_) => Err("root is not a JSON object".to_string()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

fn read_document(path: &Path) -> ReadOutcome {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(e) => return ReadOutcome::Corrupt(format!("unreadable: {e}")),
    };

    match parse_document(bytes) {
        Ok(value) => ReadOutcome::Parsed(value),
        Err(reason) => ReadOutcome::Corrupt(reason),
    }
}

fn log_corrections(corrections: &[Correction]) {
    for correction in corrections {
        tracing::warn!(
            field = %correction.field,
            reason = %correction.reason,
            "Corrected configuration value"
        );
    }
}

/// Handle to the launcher configuration
///
/// Saves are serialized by an internal lock; readers get the last committed
/// document without waiting for disk I/O.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    backups: BackupRotation,
    current: RwLock<Config>,
    last_load: RwLock<LoadReport>,
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Open the store at `path` and load it
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_retention(path, MAX_BACKUPS)
    }

    /// Open the store keeping at most `keep` backups
    pub fn with_retention(path: impl Into<PathBuf>, keep: usize) -> Self {
        let path = path.into();
        let store = Self {
            backups: BackupRotation::for_config(&path, keep),
            path,
            current: RwLock::new(Config::default()),
            last_load: RwLock::new(LoadReport {
                source: LoadSource::Defaults,
                corrections: Vec::new(),
            }),
            write_lock: Mutex::new(()),
        };
        store.load();
        store
    }

    /// Open the store at the platform config path
    pub fn open_default() -> Self {
        Self::open(super::config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the configuration from disk, replacing the in-memory copy.
    ///
    /// Never fails: a corrupt file falls back to the newest readable backup,
    /// then to defaults.
    pub fn load(&self) -> LoadReport {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (validated, source) = match read_document(&self.path) {
            ReadOutcome::Parsed(value) => (validate::validate_value(&value), LoadSource::File),
            ReadOutcome::Missing => {
                tracing::info!(path = %self.path.display(), "No configuration file, using defaults");
                (
                    Validated {
                        config: Config::default(),
                        corrections: Vec::new(),
                    },
                    LoadSource::Defaults,
                )
            }
            ReadOutcome::Corrupt(reason) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %reason,
                    "Configuration file is corrupt"
                );
                self.recover()
            }
        };

        log_corrections(&validated.corrections);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = validated.config;

        let report = LoadReport {
            source,
            corrections: validated.corrections,
        };
        *self.last_load.write().unwrap_or_else(PoisonError::into_inner) = report.clone();
        report
    }

    /// Outcome of the most recent [`ConfigStore::load`]
    pub fn last_load(&self) -> LoadReport {
        self.last_load
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn recover(&self) -> (Validated, LoadSource) {
        let backups = self.backups.list().unwrap_or_else(|e| {
            tracing::warn!("Could not list configuration backups: {}", e);
            Vec::new()
        });

        for backup in backups {
            match read_document(&backup.path) {
                ReadOutcome::Parsed(value) => {
                    tracing::info!(backup = %backup.name, "Restored configuration from backup");
                    return (validate::validate_value(&value), LoadSource::Backup(backup.path));
                }
                ReadOutcome::Corrupt(reason) => {
                    tracing::warn!(backup = %backup.name, %reason, "Skipping corrupt backup");
                }
                ReadOutcome::Missing => {}
            }
        }

        tracing::warn!("No usable backup, falling back to default configuration");
        (
            Validated {
                config: Config::default(),
                corrections: Vec::new(),
            },
            LoadSource::Defaults,
        )
    }

    /// Snapshot of the current document
    pub fn get(&self) -> Config {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change one field in memory, repairing the value like [`validate::validate`] would.
    ///
    /// Call [`ConfigStore::commit`] to persist.
    pub fn set(&self, field: Field, value: Value) -> Option<Correction> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let correction = validate::apply_field(&mut current, field, &value);
        if let Some(correction) = &correction {
            tracing::warn!(%correction, "Adjusted value on set");
        }
        correction
    }

    /// Like [`ConfigStore::set`], addressing the field by its JSON key
    pub fn set_by_name(&self, name: &str, value: Value) -> Result<Option<Correction>> {
        let field: Field = name.parse()?;
        Ok(self.set(field, value))
    }

    /// Validate and persist `config`, backing up the previous file first.
    ///
    /// On success `config` becomes the in-memory document; on failure the
    /// in-memory document is left as it was.
    pub fn save(&self, config: &Config) -> Result<Vec<Correction>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let validated = self.write_locked(config)?;

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = validated.config;
        Ok(validated.corrections)
    }

    /// Persist the current in-memory document.
    ///
    /// The snapshot is taken once the write lock is held, so values `set`
    /// while another save was in flight are included.
    pub fn commit(&self) -> Result<Vec<Correction>> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.get();
        let validated = self.write_locked(&snapshot)?;

        // Only fold repairs back if nobody changed the document meanwhile
        if validated.config != snapshot {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            if *current == snapshot {
                *current = validated.config;
            }
        }
        Ok(validated.corrections)
    }

    /// Write `initial` if no configuration file exists yet.
    ///
    /// Returns whether a file was created.
    pub fn create_if_missing(&self, initial: &Config) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            return Ok(false);
        }

        let validated = self.write_locked(initial)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = validated.config;
        Ok(true)
    }

    /// Back up the live file and write `config`; caller holds `write_lock`
    fn write_locked(&self, config: &Config) -> Result<Validated> {
        let validated = validate::validate(config);
        log_corrections(&validated.corrections);

        let mut json = serde_json::to_string_pretty(&validated.config)?;
        json.push('\n');

        self.backups.create(&self.path)?;
        util::fs::write_atomic(&self.path, json.as_bytes()).map_err(|source| {
            StoreError::Persist {
                path: self.path.clone(),
                source,
            }
        })?;

        tracing::info!(path = %self.path.display(), "Configuration saved");
        Ok(validated)
    }

    /// Retained backups, newest first
    pub fn backups(&self) -> Result<Vec<BackupEntry>> {
        self.backups.list()
    }

    /// Make a backup the live configuration again.
    ///
    /// The current file is itself backed up before being replaced.
    pub fn restore_backup(&self, name: &str) -> Result<Vec<Correction>> {
        let entry = self
            .backups
            .find(name)?
            .ok_or_else(|| StoreError::BackupNotFound(name.to_string()))?;

        let bytes = std::fs::read(&entry.path).map_err(|source| StoreError::ReadBackup {
            path: entry.path.clone(),
            source,
        })?;
        let value = parse_document(bytes).map_err(|reason| {
            tracing::warn!(backup = %entry.name, %reason, "Refusing to restore corrupt backup");
            StoreError::CorruptBackup(entry.path.clone())
        })?;

        let validated = validate::validate_value(&value);
        let mut corrections = validated.corrections;
        corrections.extend(self.save(&validated.config)?);

        tracing::info!(backup = %entry.name, "Configuration restored from backup");
        Ok(corrections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::open(dir.path().join("config.json"))
    }

    fn config_with(ram: u32, nickname: &str) -> Config {
        Config {
            ram,
            nickname: nickname.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let report = store.load();
        assert_eq!(report.source, LoadSource::Defaults);
        assert_eq!(
            serde_json::to_value(store.get()).unwrap(),
            json!({
                "ram": 4,
                "nickname": "Player",
                "theme": "dark",
                "auto_update": true,
                "window_width": 1200,
                "window_height": 800,
                "skin": "",
                "java_path": ""
            })
        );
        // Loading never creates the file
        assert!(!store.path().exists());
    }

    #[test]
    fn test_out_of_range_ram_is_clamped_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ram": 999, "nickname": "Steve"}"#).unwrap();

        let store = ConfigStore::open(&path);
        let config = store.get();
        assert_eq!(config.ram, 32);
        assert_eq!(config.nickname, "Steve");
    }

    #[test]
    fn test_invalid_json_without_backup_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{\"ram\": 8,").unwrap();

        let store = ConfigStore::open(&path);
        assert_eq!(store.load().source, LoadSource::Defaults);
        assert_eq!(store.get(), Config::default());
    }

    #[test]
    fn test_corrupt_file_recovers_newest_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&config_with(6, "First")).unwrap();
        store.save(&config_with(10, "Second")).unwrap();
        store.save(&config_with(12, "Third")).unwrap();

        std::fs::write(store.path(), [0xff, 0xfe, 0x00]).unwrap();

        let reopened = store_in(&dir);
        assert!(matches!(reopened.last_load().source, LoadSource::Backup(_)));
        assert_eq!(reopened.get(), config_with(10, "Second"));
    }

    #[test]
    fn test_corrupt_backups_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&config_with(6, "First")).unwrap();
        store.save(&config_with(10, "Second")).unwrap();
        store.save(&config_with(12, "Third")).unwrap();

        let newest = store.backups().unwrap().remove(0);
        std::fs::write(&newest.path, "[]").unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get(), config_with(6, "First"));
    }

    #[test]
    fn test_save_load_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store
            .save(&Config {
                ram: 8,
                theme: Theme::Light,
                auto_update: false,
                ..Config::default()
            })
            .unwrap();
        let first = std::fs::read(store.path()).unwrap();

        let reopened = store_in(&dir);
        let corrections = reopened.save(&reopened.get()).unwrap();
        assert!(corrections.is_empty());
        assert_eq!(std::fs::read(store.path()).unwrap(), first);

        let report = store_in(&dir).load();
        assert_eq!(report.source, LoadSource::File);
        assert!(report.corrections.is_empty());
    }

    #[test]
    fn test_backup_count_is_bounded() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::with_retention(dir.path().join("config.json"), 3);

        for ram in 2..=20 {
            store.save(&config_with(ram, "Player")).unwrap();
            assert!(store.backups().unwrap().len() <= 3);
        }
        assert_eq!(store.backups().unwrap().len(), 3);
    }

    #[test]
    fn test_newest_backup_matches_previous_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&config_with(6, "Before")).unwrap();
        let before = std::fs::read(store.path()).unwrap();

        store.save(&config_with(8, "After")).unwrap();

        let newest = store.backups().unwrap().remove(0);
        assert_eq!(std::fs::read(newest.path).unwrap(), before);
    }

    #[test]
    fn test_save_validates_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let corrections = store
            .save(&Config {
                ram: 64,
                nickname: "\u{1b}[31mRed".to_string(),
                window_width: 10,
                ..Config::default()
            })
            .unwrap();

        assert_eq!(corrections.len(), 3);
        let saved = store_in(&dir).get();
        assert_eq!(saved.ram, 32);
        assert_eq!(saved.nickname, "[31mRed");
        assert_eq!(saved.window_width, 600);
    }

    #[test]
    fn test_set_repairs_only_touched_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.set(Field::Ram, json!(12)).is_none());
        assert!(store.set(Field::Theme, json!("light")).is_none());
        let correction = store.set(Field::WindowHeight, json!(100_000)).unwrap();
        assert_eq!(correction.field, "window_height");

        let config = store.get();
        assert_eq!(config.ram, 12);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.window_height, 4320);
        assert_eq!(config.nickname, "Player");

        // Not persisted until committed
        assert!(!store.path().exists());
        store.commit().unwrap();
        assert_eq!(store_in(&dir).get(), config);
    }

    #[test]
    fn test_set_by_unknown_name_fails() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let err = store.set_by_name("volume", json!(3)).unwrap_err();
        assert!(matches!(err, StoreError::UnknownField(_)));
        assert_eq!(store.get(), Config::default());
    }

    #[test]
    fn test_failed_save_keeps_memory_valid() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join("launcher");
        let store = ConfigStore::open(config_dir.join("config.json"));
        store.save(&config_with(8, "Steve")).unwrap();

        // Replace the config directory with a plain file so every write fails
        std::fs::remove_dir_all(&config_dir).unwrap();
        std::fs::write(&config_dir, "").unwrap();

        let err = store.save(&config_with(16, "Alex")).unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }));
        assert_eq!(store.get(), config_with(8, "Steve"));
        assert!(validate::validate(&store.get()).is_clean());
    }

    #[test]
    fn test_concurrent_saves_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::thread::scope(|scope| {
            for i in 0..8u32 {
                let store = &store;
                scope.spawn(move || {
                    for _ in 0..10 {
                        store.save(&config_with(2 + i, &format!("Player{i}"))).unwrap();
                    }
                });
            }
        });

        let check = |config: &Config| {
            assert_eq!(config.nickname, format!("Player{}", config.ram - 2));
        };

        let reopened = store_in(&dir);
        assert_eq!(reopened.load().source, LoadSource::File);
        check(&reopened.get());
        check(&store.get());
        assert_eq!(store.get(), reopened.get());

        for backup in store.backups().unwrap() {
            let value: Value = serde_json::from_slice(&std::fs::read(backup.path).unwrap()).unwrap();
            check(&validate::validate_value(&value).config);
        }
    }

    #[test]
    fn test_restore_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&config_with(6, "Old")).unwrap();
        store.save(&config_with(20, "New")).unwrap();

        let backup = store.backups().unwrap().remove(0);
        store.restore_backup(&backup.name).unwrap();

        assert_eq!(store.get(), config_with(6, "Old"));
        assert_eq!(store_in(&dir).get(), config_with(6, "Old"));
        // The replaced document was backed up too
        let newest = store.backups().unwrap().remove(0);
        let value: Value = serde_json::from_slice(&std::fs::read(newest.path).unwrap()).unwrap();
        assert_eq!(value["nickname"], "New");

        let err = store.restore_backup("config.nope.bak.json").unwrap_err();
        assert!(matches!(err, StoreError::BackupNotFound(_)));
    }

    #[test]
    fn test_create_if_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.create_if_missing(&config_with(12, "Player")).unwrap());
        assert!(!store.create_if_missing(&config_with(3, "Player")).unwrap());
        assert!(store.backups().unwrap().is_empty());
        assert_eq!(store.get().ram, 12);
        assert_eq!(store_in(&dir).get().ram, 12);
    }

    #[test]
    fn test_restore_rejects_non_object_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&config_with(6, "Old")).unwrap();
        store.save(&config_with(20, "Kept")).unwrap();

        let backup = store.backups().unwrap().remove(0);
        std::fs::write(&backup.path, "[]").unwrap();

        let err = store.restore_backup(&backup.name).unwrap_err();
        assert!(matches!(err, StoreError::CorruptBackup(_)));
        assert_eq!(store.get(), config_with(20, "Kept"));
        assert_eq!(store_in(&dir).get(), config_with(20, "Kept"));
    }

    #[test]
    fn test_set_during_inflight_save_survives_commit() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::thread::scope(|scope| {
            // Stand-in for a save already holding the lock
            let guard = store.write_lock.lock().unwrap();

            let committer = scope.spawn(|| {
                store.set(Field::Ram, json!(8));
                store.commit().unwrap();
            });

            while store.get().ram != 8 {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            store.set(Field::Nickname, json!("Steve"));
            drop(guard);

            committer.join().unwrap();
        });

        assert_eq!(store.get(), config_with(8, "Steve"));
        assert_eq!(store_in(&dir).get(), config_with(8, "Steve"));
    }

    #[test]
    fn test_commit_keeps_concurrent_sets() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..20 {
                    store.commit().unwrap();
                }
            });
            for i in 0..20u32 {
                store.set(Field::Ram, json!(2 + i));
            }
        });

        assert_eq!(store.get().ram, 21);
        store.commit().unwrap();
        assert_eq!(store_in(&dir).get().ram, 21);
    }
}
