//! Layered configuration loading.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Global file `~/.videoclaw/config.toml`
//! 3. Project file `<project>/.videoclaw/config.toml`
//! 4. Environment: leaf key `a.b.c` is overridden by `VIDEOCLAW_A_B_C`
//!
//! File layers are merged recursively: a nested table in a higher layer only
//! replaces the keys it names.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};

use super::settings::Settings;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "VIDEOCLAW";

/// File name of global and project config files.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid merged config: {0}")]
    InvalidSettings(#[source] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Environment variable {var}={value:?} is not a valid {expected}")]
    InvalidEnv {
        var: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid config key '{0}'")]
    InvalidKey(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads settings from the layered sources.
pub struct ConfigManager {
    /// Global config file (None when no home directory is known).
    global_path: Option<PathBuf>,
    /// Project config file, if a project is in scope.
    project_path: Option<PathBuf>,
    /// Settings from the last load.
    settings: Settings,
}

impl ConfigManager {
    /// Manager reading the global file from the user's home directory.
    pub fn new() -> Self {
        Self {
            global_path: global_config_path(),
            project_path: None,
            settings: Settings::default(),
        }
    }

    /// Override the global file location (`None` disables the layer).
    pub fn with_global_path(mut self, path: Option<PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    /// Add a project config file layer.
    pub fn with_project_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = Some(path.into());
        self
    }

    /// Global config file location.
    pub fn global_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Project config file location.
    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    /// Settings from the last load (defaults before any load).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Load all layers using the process environment.
    pub fn load(&mut self) -> ConfigResult<&Settings> {
        self.load_with_env(|var| std::env::var(var).ok())
    }

    /// Load all layers with a custom environment lookup.
    pub fn load_with_env<F>(&mut self, env: F) -> ConfigResult<&Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut merged = match Value::try_from(Settings::default())? {
            Value::Table(table) => table,
            _ => Table::new(),
        };

        // A broken global file never blocks work on a project.
        if let Some(ref path) = self.global_path {
            match read_table(path) {
                Ok(Some(table)) => merge_tables(&mut merged, table),
                Ok(None) => {}
                Err(e) => tracing::warn!("Ignoring global config: {}", e),
            }
        }

        if let Some(ref path) = self.project_path {
            if let Some(table) = read_table(path)? {
                merge_tables(&mut merged, table);
            }
        }

        apply_env_overrides(&mut merged, ENV_PREFIX, &env)?;

        self.settings = Value::Table(merged)
            .try_into()
            .map_err(ConfigError::InvalidSettings)?;
        Ok(&self.settings)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `~/.videoclaw`, if a home directory is known.
pub fn home_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".videoclaw"))
}

/// `~/.videoclaw/config.toml`, if a home directory is known.
pub fn global_config_path() -> Option<PathBuf> {
    home_config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Recursively merge `overlay` into `base`.
///
/// Tables present on both sides are merged key by key; any other value in
/// `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Environment variable name for a dotted key.
pub fn env_var_for(key: &str) -> String {
    format!("{}_{}", ENV_PREFIX, key.to_uppercase().replace('.', "_"))
}

fn read_table(path: &Path) -> ConfigResult<Option<Table>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    let table = toml::from_str::<Table>(&content).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(table))
}

fn apply_env_overrides<F>(table: &mut Table, prefix: &str, env: &F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    for (key, value) in table.iter_mut() {
        let var = format!("{}_{}", prefix, key.to_uppercase());
        if let Value::Table(nested) = value {
            apply_env_overrides(nested, &var, env)?;
            continue;
        }

        let Some(raw) = env(&var) else {
            continue;
        };

        *value = match value {
            Value::Boolean(_) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Value::Boolean(true),
                "0" | "false" | "no" | "off" => Value::Boolean(false),
                _ => return Err(invalid_env(var, raw, "boolean")),
            },
            Value::Integer(_) => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| invalid_env(var.clone(), raw.clone(), "integer"))?,
            Value::Float(_) => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid_env(var.clone(), raw.clone(), "number"))?,
            _ => Value::String(raw),
        };
        tracing::debug!("Config key overridden by {}", var);
    }
    Ok(())
}

fn invalid_env(var: String, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidEnv {
        var,
        value,
        expected,
    }
}
