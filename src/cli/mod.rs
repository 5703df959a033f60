//! CLI module
//!
//! Command-line interface for the launcher settings.

mod args;

pub use args::{Args, BackupAction, Commands, ConfigAction};

use anyhow::{Context, Result};
use innlab_launcher::config::{Config, ConfigStore, Correction, Field, LoadSource};
use innlab_launcher::launcher::{self, LauncherDirs};

/// Dispatch a parsed command
pub fn run(command: Commands, store: &ConfigStore, dirs: &LauncherDirs) -> Result<()> {
    match command {
        Commands::Init => init(store, dirs),
        Commands::Config { action } => match action {
            ConfigAction::Show => show(store),
            ConfigAction::Path => {
                println!("{}", store.path().display());
                Ok(())
            }
            ConfigAction::Get { field } => get(store, &field),
            ConfigAction::Set { field, value } => set(store, dirs, &field, &value),
            ConfigAction::Reset => reset(store, dirs),
            ConfigAction::Open => open_folder(store),
        },
        Commands::Backups { action } => match action {
            BackupAction::List => list_backups(store),
            BackupAction::Restore { name } => restore_backup(store, dirs, &name),
        },
    }
}

fn print_corrections(corrections: &[Correction]) {
    if corrections.is_empty() {
        return;
    }
    println!("⚠️  Adjusted values:");
    for correction in corrections {
        println!("   - {}", correction);
    }
}

/// Create launcher directories and default config
fn init(store: &ConfigStore, dirs: &LauncherDirs) -> Result<()> {
    let report = launcher::initialize(dirs, store)?;

    println!("✅ Launcher initialized");
    println!("   Data: {}", dirs.root().display());
    println!("   Config: {}", store.path().display());
    if report.config_created {
        println!("   Default configuration created.");
    }
    Ok(())
}

/// Print the validated configuration
fn show(store: &ConfigStore) -> Result<()> {
    let report = store.last_load();

    match &report.source {
        LoadSource::File => {}
        LoadSource::Backup(path) => {
            println!("⚠️  Config file was corrupt, showing backup {}", path.display())
        }
        LoadSource::Defaults => println!("ℹ️  No usable config file, showing defaults"),
    }
    print_corrections(&report.corrections);

    let json = serde_json::to_string_pretty(&store.get())?;
    println!("{}", json);
    Ok(())
}

/// Print a single field
fn get(store: &ConfigStore, name: &str) -> Result<()> {
    let field: Field = name.parse()?;
    match field.read(&store.get()) {
        serde_json::Value::String(s) => println!("{}", s),
        other => println!("{}", other),
    }
    Ok(())
}

/// Change a field and persist it
fn set(store: &ConfigStore, dirs: &LauncherDirs, name: &str, raw: &str) -> Result<()> {
    let field: Field = name.parse()?;

    if let Some(correction) = store.set(field, field.parse_input(raw)) {
        print_corrections(&[correction]);
    }
    print_corrections(&launcher::commit_settings(store, dirs)?);

    println!("✅ {} = {}", field, field.read(&store.get()));
    Ok(())
}

/// Restore default settings
fn reset(store: &ConfigStore, dirs: &LauncherDirs) -> Result<()> {
    store
        .save(&Config::default())
        .context("Failed to save configuration")?;
    dirs.sync_skin(&store.get());
    println!("✅ Configuration reset to defaults (previous file kept as a backup).");
    Ok(())
}

/// Open the config folder in the system file manager
fn open_folder(store: &ConfigStore) -> Result<()> {
    let dir = store
        .path()
        .parent()
        .context("Config path has no parent directory")?;
    std::fs::create_dir_all(dir)?;
    open::that(dir).with_context(|| format!("Failed to open {:?}", dir))?;
    Ok(())
}

/// List retained backups
fn list_backups(store: &ConfigStore) -> Result<()> {
    let backups = store.backups()?;

    if backups.is_empty() {
        println!("🗄️  No backups yet.");
        println!("   A backup is taken every time the configuration is saved.");
        return Ok(());
    }

    println!("🗄️  Backups ({}):", backups.len());
    for backup in &backups {
        println!(
            "   {}  ({} UTC)",
            backup.name,
            backup.created.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

/// Roll back to a backup
fn restore_backup(store: &ConfigStore, dirs: &LauncherDirs, name: &str) -> Result<()> {
    let corrections = store
        .restore_backup(name)
        .with_context(|| format!("Failed to restore backup '{}'", name))?;
    print_corrections(&corrections);
    dirs.sync_skin(&store.get());

    println!("✅ Restored configuration from {}", name);
    Ok(())
}
