//! Pipeline orchestrator for coordinating step execution.
//!
//! Every step runs through the same contract (see [`PipelineStep`]):
//! precondition check, `in_progress`, execute, then `completed` with the
//! output or `failed` with the error. Progress lives in the project's
//! [`StateStore`](crate::state::StateStore).
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Analyze      (script -> characters, scenes, frames)
//!     ├── Step: Assets       (character and scene images)
//!     ├── Step: Storyboard   (one image per frame)
//!     ├── Step: I2v          (one clip per frame)
//!     ├── Step: Audio        (narration, music)
//!     └── Step: Merge        (final video)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use videoclaw_core::orchestrator::{create_standard_pipeline, Context};
//!
//! let ctx = Context::for_project(layout, settings, logger)?;
//! let mut state = StateStore::load(ctx.layout.root())?;
//!
//! let report = create_standard_pipeline("An astronaut on mars").run(&ctx, &mut state);
//! println!("{}", report.status);
//! ```

mod confirm;
mod errors;
mod outputs;
mod pipeline;
mod selection;
mod step;
pub mod steps;
mod types;
mod variants;

#[cfg(test)]
mod testing;

pub use confirm::{Confirmer, Decision, ScriptedConfirmer, TerminalConfirmer};
pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use outputs::{
    AnalysisOutput, AssetsOutput, AudioOutput, Character, Dialogue, FrameImage, FramePlan,
    I2vOutput, MergeOutput, Prop, Scene, StoryboardFrame, StoryboardOutput, VideoClip,
};
pub use pipeline::{run_step, Pipeline};
pub use selection::select_artifact;
pub use step::{check_predecessors, PipelineStep};
pub use steps::{AnalyzeStep, AssetsStep, AudioStep, I2vStep, MergeStep, StoryboardStep};
pub use types::{Context, PipelineReport, ProgressCallback, ReportStatus, StepReport};
pub use variants::{generate_candidates, produce_item, Candidates, ItemOutcome};

/// Create the full pipeline for `script`.
///
/// The standard pipeline executes these steps:
/// 1. Analyze - parse the script
/// 2. Assets - character and scene images
/// 3. Storyboard - frame images
/// 4. I2v - animate each frame
/// 5. Audio - narration and music
/// 6. Merge - concatenate and mux
pub fn create_standard_pipeline(script: impl Into<String>) -> Pipeline {
    Pipeline::new()
        .with_step(AnalyzeStep::new(script))
        .with_step(AssetsStep::new())
        .with_step(StoryboardStep::new())
        .with_step(I2vStep::new())
        .with_step(AudioStep::new())
        .with_step(MergeStep::new())
}
