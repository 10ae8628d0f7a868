//! Logging infrastructure for videoclaw.
//!
//! This module provides:
//! - Per-project loggers with file + console callback dual output
//! - A registry handing out one logger per project
//! - Tail buffer for external tool output
//! - Integration with the `tracing` ecosystem for process-level logs
//!
//! # Example
//!
//! ```no_run
//! use videoclaw_core::logging::{LogConfig, ProjectLogger};
//!
//! let logger = ProjectLogger::new(
//!     "demo",
//!     "/path/to/demo/.videoclaw/logs",
//!     LogConfig::default(),
//!     None,
//! ).unwrap();
//!
//! logger.phase("assets");
//! logger.command("ffmpeg -f concat ...");
//! logger.success("assets completed");
//! ```

mod project_logger;
mod registry;
mod types;

pub use project_logger::ProjectLogger;
pub use registry::{ConsoleFactory, LoggerRegistry};
pub use types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber writing to stderr.
///
/// Respects `RUST_LOG`, falling back to `default_level`. Should be called
/// once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init();
}

/// Initialize global tracing with stderr output plus a daily-rolling file
/// in `log_dir`.
///
/// The returned guard must be held until exit so buffered lines are flushed.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: &Path) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        init_tracing(default_level);
        return None;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let file_appender = tracing_appender::rolling::daily(log_dir, "videoclaw.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .try_init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_can_init_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
