//! Artifact upload.
//!
//! Uploading is always best-effort: the pipeline never fails because a copy
//! could not be made. See [`Uploader::upload_best_effort`].

mod local;
mod uploader;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use local::LocalStorage;
pub use uploader::{storage_backend, Uploader};

/// Errors from storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unknown storage provider '{0}'")]
    UnknownProvider(String),

    #[error("Storage provider '{provider}' is not configured: {message}")]
    NotConfigured { provider: String, message: String },

    #[error("Source file not found: {0}")]
    SourceMissing(PathBuf),

    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A place artifacts can be copied to.
pub trait StorageBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Copy `local` to `remote_path` (a `/`-separated relative path) and
    /// return a URL for the copy.
    fn upload(&self, local: &Path, remote_path: &str) -> StorageResult<String>;
}
