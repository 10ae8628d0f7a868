//! State store with write-through persistence.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::types::{now, SelectionRecord, StateDocument, StepName, StepRecord, StepStatus};

/// Directory under a project that holds tool metadata.
pub const STATE_DIR: &str = ".videoclaw";
/// File name of the state document inside [`STATE_DIR`].
pub const STATE_FILE: &str = "state.json";

/// Errors from loading or persisting project state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to {operation} state file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("State file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Output of step '{step}' has an unexpected shape: {message}")]
    OutputShape { step: StepName, message: String },

    #[error("Selection for step '{0}' needs at least one alternative")]
    EmptyAlternatives(StepName),
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Store for one project's state document.
///
/// Reads are served from memory; every mutation is persisted before the
/// method returns.
#[derive(Debug)]
pub struct StateStore {
    project_path: PathBuf,
    state_file: PathBuf,
    doc: StateDocument,
}

impl StateStore {
    /// Load the state for a project.
    ///
    /// A missing state file is the initial state: a fresh document with
    /// status `initialized` is synthesized (and not written until the
    /// first mutation). A file that exists but does not parse is an error;
    /// progress is never silently reset.
    pub fn load(project_path: impl Into<PathBuf>) -> StateResult<Self> {
        let project_path = project_path.into();
        let state_file = project_path.join(STATE_DIR).join(STATE_FILE);

        let doc = if state_file.exists() {
            let content = fs::read_to_string(&state_file).map_err(|source| StateError::Io {
                operation: "read",
                path: state_file.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| StateError::Corrupt {
                path: state_file.clone(),
                source,
            })?
        } else {
            StateDocument::initial(project_id_for(&project_path))
        };

        tracing::debug!("Loaded state for {}", project_path.display());

        Ok(Self {
            project_path,
            state_file,
            doc,
        })
    }

    /// Project directory this store belongs to.
    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Path of the persisted document.
    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    /// The in-memory document.
    pub fn document(&self) -> &StateDocument {
        &self.doc
    }

    /// Current overall status, or `"unknown"` if the document has none.
    pub fn get_status(&self) -> &str {
        match self.doc.status.as_deref() {
            Some(status) if !status.is_empty() => status,
            _ => "unknown",
        }
    }

    /// Overwrite the overall status and persist.
    pub fn set_status(&mut self, status: impl Into<String>) -> StateResult<()> {
        self.doc.status = Some(status.into());
        self.doc.updated_at = Some(now());
        self.save()
    }

    /// Upsert the record for `step` and persist.
    ///
    /// Re-running a step replaces its previous record.
    pub fn update_step(
        &mut self,
        step: StepName,
        status: StepStatus,
        output: Option<Value>,
    ) -> StateResult<()> {
        self.doc.steps.insert(
            step,
            StepRecord {
                status,
                updated_at: now(),
                output,
            },
        );
        self.doc.updated_at = Some(now());
        self.save()
    }

    /// Record for `step`, if it ever started.
    pub fn get_step(&self, step: StepName) -> Option<&StepRecord> {
        self.doc.steps.get(&step)
    }

    /// Whether `step` currently has status `completed`.
    pub fn is_completed(&self, step: StepName) -> bool {
        self.get_step(step)
            .map(|record| record.status == StepStatus::Completed)
            .unwrap_or(false)
    }

    /// Deserialize the output of a completed step into a typed structure.
    ///
    /// Returns `Ok(None)` when the step is not completed or has no output.
    pub fn completed_output<T: DeserializeOwned>(&self, step: StepName) -> StateResult<Option<T>> {
        let Some(record) = self.get_step(step) else {
            return Ok(None);
        };
        if record.status != StepStatus::Completed {
            return Ok(None);
        }
        match &record.output {
            Some(output) => serde_json::from_value(output.clone())
                .map(Some)
                .map_err(|e| StateError::OutputShape {
                    step,
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Upsert the selection record for `step` and persist.
    pub fn update_selection(
        &mut self,
        step: StepName,
        chosen: impl Into<String>,
        alternatives: Vec<String>,
    ) -> StateResult<()> {
        if alternatives.is_empty() {
            return Err(StateError::EmptyAlternatives(step));
        }
        self.doc.selections.insert(
            step,
            SelectionRecord {
                chosen: chosen.into(),
                alternatives,
                updated_at: now(),
            },
        );
        self.doc.updated_at = Some(now());
        self.save()
    }

    /// Selection record for `step`.
    pub fn get_selection(&self, step: StepName) -> Option<&SelectionRecord> {
        self.doc.selections.get(&step)
    }

    /// Every alternative of every selection, in step order, duplicates kept.
    pub fn get_all_alternatives(&self) -> Vec<String> {
        self.doc
            .selections
            .values()
            .flat_map(|selection| selection.alternatives.iter().cloned())
            .collect()
    }

    /// Persist the whole document.
    ///
    /// Writes to a temp file beside the document, then renames over it.
    pub fn save(&self) -> StateResult<()> {
        if let Some(parent) = self.state_file.parent() {
            fs::create_dir_all(parent).map_err(|source| StateError::Io {
                operation: "create directory for",
                path: self.state_file.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(&self.doc)?;

        let temp_file = self.state_file.with_extension("json.tmp");
        fs::write(&temp_file, &json).map_err(|source| StateError::Io {
            operation: "write",
            path: temp_file.clone(),
            source,
        })?;
        fs::rename(&temp_file, &self.state_file).map_err(|source| StateError::Io {
            operation: "replace",
            path: self.state_file.clone(),
            source,
        })?;

        tracing::trace!("Saved state to {}", self.state_file.display());
        Ok(())
    }
}

fn project_id_for(project_path: &Path) -> String {
    project_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
