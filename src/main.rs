//! InnLab Launcher - settings core of the modpack launcher
//!
//! Entry point for the command-line interface.

mod cli;

use clap::Parser;
use cli::Args;
use innlab_launcher::config::ConfigStore;
use innlab_launcher::launcher::LauncherDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dirs = LauncherDirs::default();

    // Console always; the log file only if logs/ is writable
    let (file_layer, _log_guard): (_, Option<WorkerGuard>) = match dirs.log_appender() {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Err(e) => {
            eprintln!("Warning: file logging disabled: {:#}", e);
            (None, None)
        }
    };

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(file_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let store = match &args.config {
        Some(path) => ConfigStore::open(path),
        None => ConfigStore::open_default(),
    };

    cli::run(args.command, &store, &dirs)
}
