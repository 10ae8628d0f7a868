//! Shared fixtures for orchestrator tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use crate::config::Settings;
use crate::logging::ProjectLogger;
use crate::media::{MediaError, MediaMerger, MediaResult};
use crate::project::ProjectLayout;
use crate::providers::Backends;
use crate::state::StateStore;

use super::types::Context;

/// Freshly initialised project in a temp dir.
pub struct TestProject {
    _dir: TempDir,
    pub layout: ProjectLayout,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::init(dir.path(), "demo").unwrap();
        Self { _dir: dir, layout }
    }

    pub fn state(&self) -> StateStore {
        StateStore::load(self.layout.root()).unwrap()
    }
}

/// Writes the concatenated input bytes; never shells out.
pub struct FakeMerger;

impl MediaMerger for FakeMerger {
    fn concat(&self, clips: &[PathBuf], output: &Path, _logger: &ProjectLogger) -> MediaResult<()> {
        if clips.is_empty() {
            return Err(MediaError::NoInputs);
        }
        let mut bytes = Vec::new();
        for clip in clips {
            let data = fs::read(clip).map_err(|_| MediaError::InputMissing(clip.clone()))?;
            bytes.extend(data);
        }
        fs::write(output, bytes).map_err(|source| MediaError::Io {
            operation: "writing merged clip".to_string(),
            source,
        })
    }

    fn add_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        _logger: &ProjectLogger,
    ) -> MediaResult<()> {
        if !audio.exists() {
            return Err(MediaError::InputMissing(audio.to_path_buf()));
        }
        fs::copy(video, output).map(|_| ()).map_err(|source| MediaError::Io {
            operation: "copying video".to_string(),
            source,
        })
    }
}

/// Context with mock backends, a fake merger and console-less logging.
pub fn test_context(project: &TestProject) -> Context {
    test_context_with(project, Settings::default())
}

pub fn test_context_with(project: &TestProject, settings: Settings) -> Context {
    let backends = Backends::from_settings(&settings.models, &project.layout.scratch_dir()).unwrap();
    Context::new(
        project.layout.clone(),
        settings,
        Arc::new(ProjectLogger::console_only("demo", None)),
        backends,
        Box::new(FakeMerger),
    )
}
