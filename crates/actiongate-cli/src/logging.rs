//! Process-wide logging: console plus a log file, with a fallback location
//! when the primary one cannot be opened.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE: &str = "log.txt";
pub const FALLBACK_LOG_FILE: &str = "actiongate_log.txt";

/// Where file logging ended up.
#[derive(Debug)]
pub enum LogFile {
    Primary { file: File, path: PathBuf },
    Fallback { file: File, path: PathBuf, reason: String },
    Unavailable { reason: String },
}

/// Open `<primary_dir>/log.txt`, else `<fallback_dir>/actiongate_log.txt`.
pub fn open_log_file(primary_dir: &Path, fallback_dir: &Path) -> LogFile {
    let primary = primary_dir.join(LOG_FILE);
    let reason = match append(&primary) {
        Ok(file) => {
            return LogFile::Primary {
                file,
                path: primary,
            }
        }
        Err(e) => format!("{}: {e}", primary.display()),
    };

    let fallback = fallback_dir.join(FALLBACK_LOG_FILE);
    match append(&fallback) {
        Ok(file) => LogFile::Fallback {
            file,
            path: fallback,
            reason,
        },
        Err(e) => LogFile::Unavailable {
            reason: format!("{reason}; {}: {e}", fallback.display()),
        },
    }
}

fn append(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Daemon logging: stdout plus a log file. `RUST_LOG` overrides the level.
pub fn init_daemon(log_dir: &Path) {
    let target = open_log_file(log_dir, &std::env::temp_dir());

    let (file, note) = match target {
        LogFile::Primary { file, path } => (Some(file), Note::Using(path)),
        LogFile::Fallback { file, path, reason } => (Some(file), Note::Fallback(path, reason)),
        LogFile::Unavailable { reason } => (None, Note::NoFile(reason)),
    };

    let file_layer = file.map(|f| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    match note {
        Note::Using(path) => tracing::info!("Using log: {}", path.display()),
        Note::Fallback(path, reason) => {
            tracing::warn!("Fallback log: {} (orig error: {reason})", path.display())
        }
        Note::NoFile(reason) => tracing::warn!("No file logging possible: {reason}"),
    }

    install_panic_hook();
}

/// Operator subcommands: warnings and errors only, on stderr so stdout
/// stays clean for output.
pub fn init_console() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

enum Note {
    Using(PathBuf),
    Fallback(PathBuf, String),
    NoFile(String),
}

/// Route panics through tracing before the default hook runs.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("Uncaught: {info}");
        default_hook(info);
    }));
}
