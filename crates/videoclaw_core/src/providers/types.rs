//! Provider result and error types.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One unit of generated media.
///
/// The step that requested it owns the scratch file until it is copied into
/// the project's artifact directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// File written by the backend.
    pub local_path: PathBuf,
    /// Remote copy, if the backend (or an upload) produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_url: Option<String>,
    /// Provider and model names plus backend-specific fields.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl GenerationResult {
    pub fn new(local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            cloud_url: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_cloud_url(mut self, url: impl Into<String>) -> Self {
        self.cloud_url = Some(url.into());
        self
    }
}

/// Options for image-to-video generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOptions {
    /// `WIDTHxHEIGHT`.
    pub resolution: String,
    /// Requested clip length; backends may round.
    pub duration_secs: u32,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            resolution: "1280x720".to_string(),
            duration_secs: 5,
        }
    }
}

/// Errors from generation backends.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No backend is registered under this name.
    #[error("Unknown {kind} provider '{name}'")]
    UnknownProvider { kind: &'static str, name: String },

    /// The backend refused or failed the request.
    #[error("{provider} generation failed: {message}")]
    Generation { provider: String, message: String },

    /// An asynchronous job reported failure.
    #[error("{provider} job failed: {message}")]
    JobFailed { provider: String, message: String },

    /// An asynchronous job did not finish in time.
    #[error("{provider} job did not finish within {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    /// Input the backend cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ProviderError {
    /// Create a generation error.
    pub fn generation(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a job failed error.
    pub fn job_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_metadata() {
        let result = GenerationResult::new("/tmp/a.png")
            .with_metadata("provider", "mock")
            .with_metadata("width", 160)
            .with_cloud_url("file:///mirror/a.png");

        assert_eq!(result.metadata["provider"], "mock");
        assert_eq!(result.metadata["width"], 160);
        assert_eq!(result.cloud_url.as_deref(), Some("file:///mirror/a.png"));
    }

    #[test]
    fn errors_name_the_provider() {
        let err = ProviderError::Timeout {
            provider: "mock".to_string(),
            timeout_secs: 300,
        };
        assert!(err.to_string().contains("300s"));
    }
}
