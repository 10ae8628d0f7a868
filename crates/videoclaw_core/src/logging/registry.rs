//! Registry of project loggers keyed by project path.
//!
//! Owned by the application for the lifetime of the process and passed to
//! whatever needs a project logger, instead of a process-wide cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::project_logger::ProjectLogger;
use super::types::{ConsoleCallback, LogConfig};

/// Builds a console callback for each new logger.
pub type ConsoleFactory = Arc<dyn Fn() -> ConsoleCallback + Send + Sync>;

/// Hands out one shared logger per project directory.
#[derive(Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<PathBuf, Arc<ProjectLogger>>>,
    console_factory: Option<ConsoleFactory>,
}

impl LoggerRegistry {
    /// Create an empty registry whose loggers have no console output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every logger created from now on a console callback.
    pub fn with_console(mut self, factory: ConsoleFactory) -> Self {
        self.console_factory = Some(factory);
        self
    }

    /// Logger for the project at `project_path`, creating it on first use.
    ///
    /// `log_dir` and `config` only apply when the logger is created.
    pub fn get_or_create(
        &self,
        project_name: &str,
        project_path: &Path,
        log_dir: &Path,
        config: LogConfig,
    ) -> std::io::Result<Arc<ProjectLogger>> {
        let mut loggers = self.loggers.lock();
        if let Some(logger) = loggers.get(project_path) {
            return Ok(Arc::clone(logger));
        }

        let console = self.console_factory.as_ref().map(|factory| factory());
        let logger = Arc::new(ProjectLogger::new(project_name, log_dir, config, console)?);
        loggers.insert(project_path.to_path_buf(), Arc::clone(&logger));

        tracing::debug!("Created project logger at {}", logger.log_path().display());
        Ok(logger)
    }

    /// Number of live loggers.
    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    /// Whether no logger has been created yet.
    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    /// Flush every logger.
    pub fn flush_all(&self) {
        for logger in self.loggers.lock().values() {
            logger.flush();
        }
    }
}
