//! File logging through `tracing` and `tracing-subscriber`.
//!
//! The terminal belongs to the TUI, so log output always goes to a file.
//! `RUST_LOG` overrides the level picked from `-v` flags.
//!
//! # Log Levels
//!
//! - `error`: dataset unavailable
//! - `warn`: storage and image-load failures (the default)
//! - `info`: startup, dataset load, session start/end, favorite toggles
//! - `debug`: cache activity, skipped prefetches
//! - `trace`: everything else

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for logging behavior
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Where log lines are appended
    pub log_file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_file: default_log_path(),
        }
    }
}

impl LogConfig {
    /// Maps the `-v` count: none is warn, then info, debug, trace
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            ..Default::default()
        }
    }

    /// Overrides the log file; `None` keeps the default location
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.log_file = path;
        }
        self
    }
}

/// `<data_dir>/archflash/archflash.log`, or the working directory when the
/// platform has no data directory
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("archflash"))
        .unwrap_or_default()
        .join("archflash.log")
}

/// Installs the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(parent) = config.log_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(config.level))
        .with(layer)
        .try_init()
        .map_err(io::Error::other)
}

/// Builds an `EnvFilter` from the given level, respecting `RUST_LOG`
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level))
}

/// Dependencies stay at warn; only this crate follows the chosen level
fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,archflash={}",
        level.as_str().to_lowercase()
    ))
}
