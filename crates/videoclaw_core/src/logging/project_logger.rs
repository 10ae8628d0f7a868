//! Per-project logger with file and console output.
//!
//! Each project gets its own logger that:
//! - Appends to `<project>/.videoclaw/logs/<YYYY-MM-DD>.log`
//! - Sends messages to a console callback (if provided)
//! - Maintains a tail buffer of external tool output for error diagnosis

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-project logger with dual output (file + console).
pub struct ProjectLogger {
    /// Project name for identification.
    project_name: String,
    /// Path to log file.
    log_path: PathBuf,
    /// File writer (buffered).
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    /// Console callback.
    console: Arc<Mutex<Option<ConsoleCallback>>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent tool output lines.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl ProjectLogger {
    /// Create a logger writing into `log_dir`.
    ///
    /// The file is named after the current date and opened for append, so
    /// several runs on the same day share one file.
    pub fn new(
        project_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        console: Option<ConsoleCallback>,
    ) -> std::io::Result<Self> {
        let project_name = project_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", Local::now().format("%Y-%m-%d")));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        Ok(Self {
            project_name,
            log_path,
            file_writer: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
            console: Arc::new(Mutex::new(console)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        })
    }

    /// Logger that only forwards to the console callback (no file).
    pub fn console_only(project_name: impl Into<String>, console: Option<ConsoleCallback>) -> Self {
        let config = LogConfig::default();
        Self {
            project_name: project_name.into(),
            log_path: PathBuf::new(),
            file_writer: Arc::new(Mutex::new(None)),
            console: Arc::new(Mutex::new(console)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        }
    }

    /// Get the project name.
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Get the log file path (empty for console-only loggers).
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level >= self.config.file_level {
            self.write_file(level, message);
        }
        if level >= self.config.console_level {
            self.write_console(level, message);
        }
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Debug, &MessagePrefix::Command.format(command));
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Section.format(section_name));
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Record a line of external tool output.
    ///
    /// Lines only go to the tail buffer and the file at debug level; call
    /// [`show_tail`](Self::show_tail) to surface them after a failure.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if buffer.len() >= self.config.error_tail.max(1) {
                buffer.pop_front();
            }
            buffer.push_back(line.to_string());
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        if LogLevel::Debug >= self.config.file_level {
            self.write_file(LogLevel::Debug, &format!("{}{}", prefix, line));
        }
    }

    /// Show the tail buffer (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.tail_buffer.lock().iter().cloned().collect();
        if lines.is_empty() {
            return;
        }

        self.log(LogLevel::Error, &format!("[{}/tail]", header));
        for line in lines {
            self.log(LogLevel::Error, &line);
        }
    }

    /// Get the current tail buffer contents.
    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    /// Clear the tail buffer.
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn write_file(&self, level: LogLevel, message: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(
                writer,
                "{} [{}] {}: {}",
                timestamp,
                level.as_filter_str().to_ascii_uppercase(),
                self.project_name,
                message
            );
        }
    }

    fn write_console(&self, level: LogLevel, message: &str) {
        let formatted = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(ref callback) = *self.console.lock() {
            callback(level, &formatted);
        }
    }
}

impl Drop for ProjectLogger {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn creates_dated_log_file() {
        let dir = tempdir().unwrap();
        let logger = ProjectLogger::new("demo", dir.path(), LogConfig::default(), None).unwrap();

        assert!(logger.log_path().exists());
        let name = logger.log_path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("{}.log", Local::now().format("%Y-%m-%d")));
    }

    #[test]
    fn appends_across_instances() {
        let dir = tempdir().unwrap();
        {
            let logger =
                ProjectLogger::new("demo", dir.path(), LogConfig::default(), None).unwrap();
            logger.info("first run");
        }
        let logger = ProjectLogger::new("demo", dir.path(), LogConfig::default(), None).unwrap();
        logger.info("second run");
        logger.flush();

        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
        assert!(content.contains("[INFO] demo:"));
    }

    #[test]
    fn levels_filter_console_and_file_separately() {
        let dir = tempdir().unwrap();
        let call_count = Arc::new(AtomicUsize::new(0));
        let count_clone = call_count.clone();
        let callback: ConsoleCallback = Box::new(move |_level, _msg| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let config = LogConfig {
            console_level: LogLevel::Warn,
            file_level: LogLevel::Debug,
            ..LogConfig::default()
        };
        let logger = ProjectLogger::new("demo", dir.path(), config, Some(callback)).unwrap();

        logger.debug("debug detail");
        logger.info("info line");
        logger.warn("careful");
        logger.flush();

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("debug detail"));
        assert!(content.contains("[WARNING] careful"));
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 5,
            ..LogConfig::default()
        };
        let logger = ProjectLogger::new("demo", dir.path(), config, None).unwrap();

        for i in 0..10 {
            logger.output_line(&format!("Line {}", i), false);
        }

        let tail = logger.get_tail();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[0], "Line 5");
        assert_eq!(tail[4], "Line 9");

        logger.clear_tail();
        assert!(logger.get_tail().is_empty());
    }

    #[test]
    fn console_only_logger_has_no_file() {
        let logger = ProjectLogger::console_only("demo", None);
        logger.info("nowhere");
        assert_eq!(logger.log_path(), Path::new(""));
    }
}
