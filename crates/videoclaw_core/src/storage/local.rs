//! Mirror directory backend.

use std::fs;
use std::path::{Path, PathBuf};

use super::{StorageBackend, StorageError, StorageResult};

/// Copies artifacts into a directory and hands out `file://` URLs.
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl StorageBackend for LocalStorage {
    fn name(&self) -> &str {
        "local"
    }

    fn upload(&self, local: &Path, remote_path: &str) -> StorageResult<String> {
        if !local.is_file() {
            return Err(StorageError::SourceMissing(local.to_path_buf()));
        }

        let mut target = self.base_dir.clone();
        for part in remote_path.split('/').filter(|p| !p.is_empty() && *p != "..") {
            target.push(part);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                operation: format!("creating {}", parent.display()),
                source,
            })?;
        }
        fs::copy(local, &target).map_err(|source| StorageError::Io {
            operation: format!("copying to {}", target.display()),
            source,
        })?;

        let absolute = target.canonicalize().unwrap_or(target);
        Ok(format!("file://{}", absolute.display()))
    }
}
