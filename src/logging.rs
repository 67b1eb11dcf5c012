//! Tracing configuration and log routing.
//!
//! Parser events are emitted under [`LOGGING_NAME`] inside a span carrying the job's logging
//! group. They go to stdout in compact form and to a log file: `DOCRELAY_LOG_FILE` when set,
//! otherwise `logs/docrelay.log`.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log target shared by every event the parser emits.
pub const LOGGING_NAME: &str = "docrelay::parsing::tika";

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "docrelay.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where the file layer writes.
#[derive(Debug, PartialEq, Eq)]
enum LogFile {
    /// Append to an operator-chosen file.
    Explicit(PathBuf),
    /// `logs/docrelay.log` under the working directory.
    Default,
}

impl LogFile {
    fn from_env_value(value: Option<String>) -> Self {
        match value.filter(|path| !path.trim().is_empty()) {
            Some(path) => Self::Explicit(PathBuf::from(path)),
            None => Self::Default,
        }
    }
}

/// Configure tracing subscribers for stdout and file logging.
///
/// Respects `RUST_LOG` for filtering and defaults to `info`. The file layer is skipped when its
/// destination cannot be opened.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    let destination = LogFile::from_env_value(std::env::var("DOCRELAY_LOG_FILE").ok());
    if let Some(writer) = configure_file_writer(&destination) {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

fn configure_file_writer(destination: &LogFile) -> Option<NonBlocking> {
    let (non_blocking, guard) = match destination {
        LogFile::Explicit(path) => match open_append(path) {
            Ok(file) => tracing_appender::non_blocking(file),
            Err(err) => {
                eprintln!("Failed to open log file {}: {err}", path.display());
                return None;
            }
        },
        LogFile::Default => {
            if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
                eprintln!("Failed to create logs directory: {err}");
                return None;
            }
            tracing_appender::non_blocking(tracing_appender::rolling::never(
                DEFAULT_LOG_DIR,
                DEFAULT_LOG_FILE,
            ))
        }
    };
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}

fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
