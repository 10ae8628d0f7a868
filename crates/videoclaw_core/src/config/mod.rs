//! Configuration management for videoclaw.
//!
//! This module provides:
//! - TOML-based settings with logical sections and defaults
//! - Layered loading: defaults, global file, project file, `VIDEOCLAW_*` env
//! - Comment-preserving single-key edits with atomic writes
//!
//! # Example
//!
//! ```no_run
//! use videoclaw_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new()
//!     .with_project_file("/path/to/demo/.videoclaw/config.toml");
//! let settings = config.load().unwrap();
//! println!("Variants per item: {}", settings.pipeline.num_variants);
//! ```

mod editor;
mod manager;
mod settings;

pub use editor::{write_default_config, ConfigFile};
pub use manager::{
    env_var_for, global_config_path, home_config_dir, merge_tables, ConfigError, ConfigManager,
    ConfigResult, CONFIG_FILE, ENV_PREFIX,
};
pub use settings::{
    AudioModelSettings, FfmpegSettings, ImageModelSettings, LoggingSettings, ModelSettings,
    PipelineSettings, ProjectSettings, Settings, StorageSettings, VideoModelSettings,
};
