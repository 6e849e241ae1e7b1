//! File logging. Stdout belongs to the terminal UI and the JSON result, so
//! events go through a non-blocking file writer.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::{Result, SettingsError};

/// Install the global subscriber writing to `log_file`.
///
/// `RUST_LOG` wins over `level`. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init(log_file: &Path, level: &str) -> Result<WorkerGuard> {
    let dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| SettingsError::Config(format!("Invalid log file: {}", log_file.display())))?;

    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| SettingsError::Config(format!("Failed to install logger: {}", e)))?;

    Ok(guard)
}
