//! Logging setup for the `mkpp3` binary.
//!
//! The library only emits `tracing` events. The binary installs a subscriber
//! that writes them to stderr and to two daily files in the app data
//! directory:
//!
//! - `mkpp3.YYYY-MM-DD.log`: everything the filter lets through
//! - `error.YYYY-MM-DD.log`: warnings and errors only
//!
//! The filter defaults to `info` and is overridden by `RUST_LOG`.
//!
//! ```no_run
//! mkpp3::logging::init().expect("Failed to initialize logging");
//! tracing::info!("ready");
//! ```

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

const MAX_LOG_FILES: usize = 10;

/// `{data_dir}/mkpp3/logs`, created if missing.
///
/// - Windows: `%APPDATA%/mkpp3/logs`
/// - macOS: `~/Library/Application Support/mkpp3/logs`
/// - Linux: `~/.local/share/mkpp3/logs`
pub fn get_log_dir() -> Result<PathBuf> {
    let base_dir = dirs::data_dir().context("Failed to determine data directory")?;
    let log_dir = base_dir.join("mkpp3").join("logs");

    if !log_dir.exists() {
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    }

    Ok(log_dir)
}

fn daily_appender(log_dir: &std::path::Path, prefix: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)
        .with_context(|| format!("Failed to create {prefix} log appender"))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log directory or the file appenders cannot be
/// created.
pub fn init() -> Result<()> {
    let log_dir = get_log_dir()?;
    let all_logs = daily_appender(&log_dir, "mkpp3")?;
    let error_logs = daily_appender(&log_dir, "error")?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")?;

    // stdout carries command output, so the console gets stderr.
    let console_layer = fmt::layer()
        .with_target(false)
        .without_time()
        .compact()
        .with_writer(std::io::stderr);

    let all_logs_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(all_logs);

    let error_logs_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(error_logs)
        .with_filter(EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(all_logs_layer)
        .with(error_logs_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!("Logging initialized, log directory: {}", log_dir.display());
    Ok(())
}

/// Today's main log file.
pub fn get_current_log_path() -> Result<PathBuf> {
    let today = chrono::Local::now().format("%Y-%m-%d");
    Ok(get_log_dir()?.join(format!("mkpp3.{today}.log")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_log_dir() {
        let Ok(log_dir) = get_log_dir() else {
            return;
        };
        assert!(log_dir.ends_with("mkpp3/logs") || log_dir.ends_with("mkpp3\\logs"));
    }

    #[test]
    fn test_current_log_path_is_dated() {
        let Ok(path) = get_current_log_path() else {
            return;
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("mkpp3.") && name.ends_with(".log"), "{name}");
    }
}
