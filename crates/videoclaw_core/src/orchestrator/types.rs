//! Core types for the orchestrator pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Settings;
use crate::logging::ProjectLogger;
use crate::media::{FfmpegMerger, MediaMerger};
use crate::project::ProjectLayout;
use crate::providers::{Backends, VideoOptions};
use crate::state::StepName;
use crate::storage::Uploader;

use super::confirm::Confirmer;
use super::errors::{PipelineError, PipelineResult};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(StepName, u32, &str) + Send + Sync>;

/// Read-only context passed to pipeline steps.
///
/// Holds the project, its settings and every collaborator a step may call.
/// Mutable progress lives in the [`StateStore`](crate::state::StateStore).
pub struct Context {
    /// Project paths.
    pub layout: ProjectLayout,
    /// Effective settings (files, environment and command line applied).
    pub settings: Settings,
    /// Per-project logger.
    pub logger: Arc<ProjectLogger>,
    /// Generation backends.
    pub backends: Backends,
    /// Final assembly.
    pub merger: Box<dyn MediaMerger>,
    /// Best-effort artifact upload.
    pub uploader: Uploader,
    /// Operator review, used when `pipeline.interactive` is set.
    confirmer: Option<Box<dyn Confirmer>>,
    /// Optional progress callback.
    progress_callback: Option<ProgressCallback>,
}

impl Context {
    /// Create a context from explicit collaborators. Uploads are disabled.
    pub fn new(
        layout: ProjectLayout,
        settings: Settings,
        logger: Arc<ProjectLogger>,
        backends: Backends,
        merger: Box<dyn MediaMerger>,
    ) -> Self {
        Self {
            layout,
            settings,
            logger,
            backends,
            merger,
            uploader: Uploader::disabled(),
            confirmer: None,
            progress_callback: None,
        }
    }

    /// Create a context with collaborators chosen by `settings`.
    pub fn for_project(
        layout: ProjectLayout,
        settings: Settings,
        logger: Arc<ProjectLogger>,
    ) -> PipelineResult<Self> {
        let backends = Backends::from_settings(&settings.models, &layout.scratch_dir()).map_err(
            |source| PipelineError::Provider {
                project: layout.name().to_string(),
                source,
            },
        )?;
        let merger = Box::new(FfmpegMerger::new(&settings.ffmpeg.path));
        let uploader = Uploader::from_settings(&settings.storage, layout.name());

        Ok(Self::new(layout, settings, logger, backends, merger).with_uploader(uploader))
    }

    pub fn with_uploader(mut self, uploader: Uploader) -> Self {
        self.uploader = uploader;
        self
    }

    /// Set the reviewer for interactive runs.
    pub fn with_confirmer(mut self, confirmer: Box<dyn Confirmer>) -> Self {
        self.confirmer = Some(confirmer);
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn project_name(&self) -> &str {
        self.layout.name()
    }

    /// The reviewer, if this run is interactive.
    pub fn confirmer(&self) -> Option<&dyn Confirmer> {
        if self.settings.pipeline.interactive {
            self.confirmer.as_deref()
        } else {
            None
        }
    }

    /// Candidates to generate per item (at least one).
    pub fn num_variants(&self) -> usize {
        self.settings.pipeline.num_variants.max(1) as usize
    }

    pub fn video_options(&self) -> VideoOptions {
        VideoOptions {
            resolution: self.settings.models.video.resolution.clone(),
            ..VideoOptions::default()
        }
    }

    /// Report progress to callback (if set).
    pub fn report_progress(&self, step: StepName, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback(step, percent, message);
        }
    }
}

/// Outcome class of one step run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Failed,
    /// Existing output was reused.
    Skipped,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportStatus::Success => "success",
            ReportStatus::Failed => "failed",
            ReportStatus::Skipped => "skipped",
        })
    }
}

/// What running one step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Refused by a precondition; state was not touched.
    #[serde(skip)]
    pub refused: bool,
}

impl StepReport {
    pub fn success(result: Value) -> Self {
        Self {
            status: ReportStatus::Success,
            result: Some(result),
            error: None,
            refused: false,
        }
    }

    pub fn skipped(result: Value) -> Self {
        Self {
            status: ReportStatus::Skipped,
            result: Some(result),
            error: None,
            refused: false,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: ReportStatus::Failed,
            result: None,
            error: Some(error.into()),
            refused: false,
        }
    }

    pub fn refused(error: impl Into<String>) -> Self {
        Self {
            refused: true,
            ..Self::failed(error)
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReportStatus::Failed
    }
}

/// Aggregate of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// `failed` if any step failed, else `success`.
    pub status: ReportStatus,
    pub results: BTreeMap<StepName, StepReport>,
}

impl PipelineReport {
    pub fn from_results(results: BTreeMap<StepName, StepReport>) -> Self {
        let status = if results.values().any(StepReport::is_failed) {
            ReportStatus::Failed
        } else {
            ReportStatus::Success
        };
        Self { status, results }
    }

    /// Steps that failed, in pipeline order.
    pub fn failed_steps(&self) -> Vec<StepName> {
        self.results
            .iter()
            .filter(|(_, report)| report.is_failed())
            .map(|(step, _)| *step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregate_reflects_worst_step() {
        let mut results = BTreeMap::new();
        results.insert(StepName::Analyze, StepReport::success(json!({})));
        results.insert(StepName::Assets, StepReport::skipped(json!({})));
        assert_eq!(
            PipelineReport::from_results(results.clone()).status,
            ReportStatus::Success
        );

        results.insert(StepName::Merge, StepReport::failed("ffmpeg missing"));
        results.insert(StepName::Storyboard, StepReport::refused("needs assets"));
        let report = PipelineReport::from_results(results);
        assert_eq!(report.status, ReportStatus::Failed);
        assert_eq!(
            report.failed_steps(),
            vec![StepName::Storyboard, StepName::Merge]
        );
    }

    #[test]
    fn report_serializes_without_internal_flags() {
        let value = serde_json::to_value(StepReport::refused("needs analyze")).unwrap();
        assert_eq!(value, json!({"status": "failed", "error": "needs analyze"}));
    }
}
