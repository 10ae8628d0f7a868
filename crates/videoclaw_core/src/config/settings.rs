//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Missing keys fall back to defaults, so partial files are fine.

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Project identity.
    #[serde(default)]
    pub project: ProjectSettings,

    /// Generation backends per media kind.
    #[serde(default)]
    pub models: ModelSettings,

    /// Cloud upload.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Pipeline behaviour.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// FFmpeg invocation.
    #[serde(default)]
    pub ffmpeg: FfmpegSettings,
}

/// Project identity written by `init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Backends per media kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default)]
    pub image: ImageModelSettings,
    #[serde(default)]
    pub video: VideoModelSettings,
    #[serde(default)]
    pub audio: AudioModelSettings,
}

/// Image generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageModelSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

impl Default for ImageModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
        }
    }
}

/// Image-to-video backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoModelSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    /// Wall-clock limit for an asynchronous generation job.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// Pause between job status checks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for VideoModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            resolution: default_resolution(),
            poll_timeout_secs: default_poll_timeout(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// Speech and music backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioModelSettings {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
}

impl Default for AudioModelSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: String::new(),
            voice: default_voice(),
        }
    }
}

/// Where generated artifacts are mirrored after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_storage_provider")]
    pub provider: String,
    /// Upload each artifact right after it is saved.
    #[serde(default)]
    pub upload_on_generate: bool,
    /// Target directory for the `local` provider.
    #[serde(default)]
    pub mirror_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            upload_on_generate: false,
            mirror_dir: String::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Console level.
    #[serde(default)]
    pub level: LogLevel,

    /// Project log file level.
    #[serde(default)]
    pub file_level: LogLevel,

    /// Number of external tool output lines to show on error.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix console lines with a timestamp.
    #[serde(default)]
    pub show_timestamps: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file_level: LogLevel::Info,
            error_tail: default_error_tail(),
            show_timestamps: false,
        }
    }
}

impl LoggingSettings {
    /// Logger configuration for a project logger.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            console_level: self.level,
            file_level: self.file_level,
            error_tail: self.error_tail as usize,
            show_timestamps: self.show_timestamps,
        }
    }
}

/// Pipeline behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Candidates per item for `assets` and `storyboard`.
    #[serde(default = "default_num_variants")]
    pub num_variants: u32,
    /// Ask the operator to review each candidate.
    #[serde(default)]
    pub interactive: bool,
    /// Skip steps whose artifacts already exist.
    #[serde(default)]
    pub reuse_existing: bool,
    /// Generate background music in the audio step.
    #[serde(default = "default_true")]
    pub bgm_enabled: bool,
    #[serde(default = "default_bgm_style")]
    pub bgm_style: String,
    #[serde(default = "default_bgm_duration")]
    pub bgm_duration_secs: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            num_variants: default_num_variants(),
            interactive: false,
            reuse_existing: false,
            bgm_enabled: true,
            bgm_style: default_bgm_style(),
            bgm_duration_secs: default_bgm_duration(),
        }
    }
}

/// FFmpeg invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfmpegSettings {
    /// Executable name or path.
    #[serde(default = "default_ffmpeg_path")]
    pub path: String,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            path: default_ffmpeg_path(),
        }
    }
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_storage_provider() -> String {
    "local".to_string()
}

fn default_resolution() -> String {
    "1280x720".to_string()
}

fn default_poll_timeout() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    5
}

fn default_voice() -> String {
    "default".to_string()
}

fn default_error_tail() -> u32 {
    20
}

fn default_num_variants() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_bgm_style() -> String {
    "ambient".to_string()
}

fn default_bgm_duration() -> u32 {
    30
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [models.video]
            resolution = "1920x1080"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.models.video.resolution, "1920x1080");
        assert_eq!(settings.models.video.poll_timeout_secs, 300);
        assert_eq!(settings.models.image.provider, "mock");
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.pipeline.num_variants, 1);
    }

    #[test]
    fn log_config_follows_logging_section() {
        let logging = LoggingSettings {
            level: LogLevel::Warn,
            file_level: LogLevel::Debug,
            error_tail: 7,
            show_timestamps: true,
        };
        let config = logging.to_log_config();
        assert_eq!(config.console_level, LogLevel::Warn);
        assert_eq!(config.file_level, LogLevel::Debug);
        assert_eq!(config.error_tail, 7);
    }
}
