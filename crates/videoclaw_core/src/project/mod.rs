//! Project lifecycle and on-disk layout.

mod layout;
mod validate;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::state::StateError;

pub use layout::{
    default_projects_root, sanitize_name, validate_project_name, ArtifactKind, ProjectLayout,
    ARTIFACT_DIRS, PROJECTS_DIR_ENV,
};
pub use validate::{validate_state, ValidationReport};

/// Errors from project management.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Invalid project name '{0}': use letters, digits, '-' and '_'")]
    InvalidName(String),

    #[error("Project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Project '{name}' not found at {path}")]
    NotFound { name: String, path: PathBuf },

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl ProjectError {
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for project operations.
pub type ProjectResult<T> = Result<T, ProjectError>;
