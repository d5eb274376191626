//! Logging configuration for checksb.
//!
//! Logs go to stderr so they never mix with the report on stdout. With
//! `--log-file` they go to a file instead, which keeps long runs reviewable.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initializes logging to stderr, or to `log_file` when one is requested.
///
/// `Some(None)` selects the default log path.
pub fn init_logging(log_file: Option<Option<&Path>>) {
    match log_file {
        None => init_stderr_logging(),
        Some(path) => {
            let path = path.map(Path::to_path_buf).unwrap_or_else(get_log_path);
            init_file_logging(&path);
        }
    }
}

/// Initializes logging to a file, falling back to stderr if the file cannot
/// be created.
pub fn init_file_logging(log_path: &Path) {
    // Ensure parent directory exists
    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            init_stderr_logging();
            return;
        }
    }

    // Truncate on each run to avoid unbounded growth
    let log_file = match File::create(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            init_stderr_logging();
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false) // No ANSI colors in file output
        .init();
}

/// Initializes logging to stderr.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the default path for the log file.
///
/// Uses XDG state directory on Linux (`~/.local/state/checksb/checksb.log`),
/// or falls back to config directory on other platforms.
pub fn get_log_path() -> PathBuf {
    // Try state directory first (XDG_STATE_HOME on Linux)
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("checksb").join("checksb.log");
    }

    // Fall back to config directory
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("checksb").join("checksb.log");
    }

    // Last resort: temp directory
    std::env::temp_dir().join("checksb.log")
}
