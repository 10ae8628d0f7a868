//! On-disk project layout.
//!
//! ```text
//! <root>/<name>/
//!   .videoclaw/{state.json, config.toml, logs/, tmp/}
//!   assets/  storyboard/  videos/  audio/
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{write_default_config, Settings, CONFIG_FILE};
use crate::state::{StateStore, STATE_DIR, STATE_FILE};

use super::{ProjectError, ProjectResult};

/// Environment variable overriding the projects root.
pub const PROJECTS_DIR_ENV: &str = "VIDEOCLAW_PROJECTS_DIR";

/// Version written into new project configs.
const PROJECT_FORMAT_VERSION: &str = "0.1.0";

/// Kinds of generated artifacts and where they live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Character,
    Scene,
    Frame,
    Video,
    Dialogue,
    Bgm,
}

impl ArtifactKind {
    /// File name prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Character => "character",
            ArtifactKind::Scene => "scene",
            ArtifactKind::Frame => "frame",
            ArtifactKind::Video => "video",
            ArtifactKind::Dialogue => "dialogue",
            ArtifactKind::Bgm => "bgm",
        }
    }

    /// Directory under the project root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArtifactKind::Character | ArtifactKind::Scene => "assets",
            ArtifactKind::Frame => "storyboard",
            ArtifactKind::Video => "videos",
            ArtifactKind::Dialogue | ArtifactKind::Bgm => "audio",
        }
    }
}

/// Artifact directories created by `init`.
pub const ARTIFACT_DIRS: [&str; 4] = ["assets", "storyboard", "videos", "audio"];

/// Paths of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    name: String,
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout for `name` under `projects_root` (nothing is touched on disk).
    pub fn new(projects_root: impl AsRef<Path>, name: impl Into<String>) -> Self {
        let name = name.into();
        let root = projects_root.as_ref().join(&name);
        Self { name, root }
    }

    /// Create a new project: directories, default config, initial state.
    pub fn init(projects_root: impl AsRef<Path>, name: &str) -> ProjectResult<Self> {
        validate_project_name(name)?;
        let layout = Self::new(projects_root, name);
        if layout.root.exists() {
            return Err(ProjectError::AlreadyExists(layout.root.clone()));
        }

        for dir in std::iter::once(STATE_DIR).chain(ARTIFACT_DIRS) {
            let path = layout.root.join(dir);
            fs::create_dir_all(&path).map_err(|e| ProjectError::io("creating project directory", e))?;
        }

        let mut settings = Settings::default();
        settings.project.name = name.to_string();
        settings.project.version = PROJECT_FORMAT_VERSION.to_string();
        write_default_config(&layout.config_file(), &settings)?;

        StateStore::load(&layout.root)?.save()?;

        tracing::info!("Created project {} at {}", name, layout.root.display());
        Ok(layout)
    }

    /// Layout of an existing project.
    pub fn open(projects_root: impl AsRef<Path>, name: &str) -> ProjectResult<Self> {
        let layout = Self::new(projects_root, name);
        if !layout.state_dir().is_dir() {
            return Err(ProjectError::NotFound {
                name: name.to_string(),
                path: layout.root.clone(),
            });
        }
        Ok(layout)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    pub fn state_file(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.state_dir().join(CONFIG_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.state_dir().join("logs")
    }

    /// Where backends write before artifacts are copied into place.
    pub fn scratch_dir(&self) -> PathBuf {
        self.state_dir().join("tmp")
    }

    pub fn dir_for(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.join("videos")
    }

    /// `<dir>/<kind>[_<name>][_<variant>].<ext>`.
    ///
    /// `variant` is 1-based; `None` omits the suffix.
    pub fn artifact_path(
        &self,
        kind: ArtifactKind,
        name: &str,
        variant: Option<usize>,
        ext: &str,
    ) -> PathBuf {
        let mut file = kind.prefix().to_string();
        let name = sanitize_name(name);
        if !name.is_empty() {
            file.push('_');
            file.push_str(&name);
        }
        if let Some(index) = variant {
            file.push_str(&format!("_{}", index));
        }
        file.push('.');
        file.push_str(ext);
        self.dir_for(kind).join(file)
    }
}

/// Project names are limited to ASCII letters, digits, `-` and `_`.
pub fn validate_project_name(name: &str) -> ProjectResult<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProjectError::InvalidName(name.to_string()))
    }
}

/// Make a logical item name safe as part of a file name.
pub fn sanitize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            c if c.is_whitespace() => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// Projects root: `VIDEOCLAW_PROJECTS_DIR`, else `~/videoclaw-projects`.
pub fn default_projects_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(PROJECTS_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join("videoclaw-projects"))
        .unwrap_or_else(|| PathBuf::from("videoclaw-projects"))
}
