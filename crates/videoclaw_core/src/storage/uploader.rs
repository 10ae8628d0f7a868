//! Best-effort upload of generated artifacts.

use std::path::Path;

use crate::config::StorageSettings;

use super::local::LocalStorage;
use super::{StorageBackend, StorageError, StorageResult};

/// Storage backend for `settings.provider`.
pub fn storage_backend(settings: &StorageSettings) -> StorageResult<Box<dyn StorageBackend>> {
    match settings.provider.as_str() {
        "local" => {
            if settings.mirror_dir.trim().is_empty() {
                return Err(StorageError::NotConfigured {
                    provider: "local".to_string(),
                    message: "storage.mirror_dir is empty".to_string(),
                });
            }
            Ok(Box::new(LocalStorage::new(&settings.mirror_dir)))
        }
        other => Err(StorageError::UnknownProvider(other.to_string())),
    }
}

/// Uploads artifacts when `storage.upload_on_generate` is set.
pub struct Uploader {
    backend: Option<Box<dyn StorageBackend>>,
    project_name: String,
}

impl Uploader {
    /// An uploader that never uploads.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            project_name: String::new(),
        }
    }

    pub fn new(backend: Box<dyn StorageBackend>, project_name: impl Into<String>) -> Self {
        Self {
            backend: Some(backend),
            project_name: project_name.into(),
        }
    }

    /// Build from config. A misconfigured backend disables uploads with a
    /// warning rather than failing the run.
    pub fn from_settings(settings: &StorageSettings, project_name: &str) -> Self {
        if !settings.upload_on_generate {
            return Self::disabled();
        }
        match storage_backend(settings) {
            Ok(backend) => Self::new(backend, project_name),
            Err(e) => {
                tracing::warn!("Uploads disabled: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Upload `local` under `<project>/<category>/<file name>`.
    ///
    /// Returns the URL, or `None` when disabled or when the upload failed.
    pub fn upload_best_effort(&self, local: &Path, category: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        let file_name = local.file_name()?.to_string_lossy();
        let remote = format!("{}/{}/{}", self.project_name, category, file_name);

        match backend.upload(local, &remote) {
            Ok(url) => {
                tracing::debug!("Uploaded {} to {}", local.display(), url);
                Some(url)
            }
            Err(e) => {
                tracing::warn!("Upload of {} failed: {}", local.display(), e);
                None
            }
        }
    }
}
