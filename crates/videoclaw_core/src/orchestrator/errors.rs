//! Error types for the orchestrator pipeline.
//!
//! Errors carry context that chains through layers:
//! Project → Step → Item → Detail

use std::io;

use thiserror::Error;

use crate::media::MediaError;
use crate::providers::ProviderError;
use crate::state::{StateError, StepName};

/// Errors while assembling what a pipeline run needs.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A configured backend could not be created.
    #[error("Project '{project}' backend setup failed: {source}")]
    Provider {
        project: String,
        #[source]
        source: ProviderError,
    },
}

/// Error from a pipeline step.
#[derive(Error, Debug)]
pub enum StepError {
    /// A predecessor is not completed. Nothing was written.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Every attempted item failed.
    #[error("All {attempted} {what} failed to generate")]
    AllItemsFailed { what: String, attempted: usize },

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// A required file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// A predecessor's recorded output could not be read.
    #[error("Failed to parse {what}: {message}")]
    ParseError { what: String, message: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    State(#[from] StateError),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Precondition error naming the first predecessor that is not completed.
    pub fn missing_predecessor(step: StepName, predecessor: StepName) -> Self {
        Self::PreconditionFailed(format!(
            "step '{}' requires '{}' to be completed first",
            step, predecessor
        ))
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a parse error.
    pub fn parse_error(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether this is a refusal that left state untouched.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::PreconditionFailed(_))
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline setup.
pub type PipelineResult<T> = Result<T, PipelineError>;
