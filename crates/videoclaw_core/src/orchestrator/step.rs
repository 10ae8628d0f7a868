//! Pipeline step trait definition.
//!
//! All pipeline steps implement this trait, providing a consistent
//! interface for precondition checks, reuse and execution.

use std::path::PathBuf;

use serde_json::Value;

use crate::state::{StateStore, StepName};

use super::errors::{StepError, StepResult};
use super::types::Context;

/// Trait for pipeline steps.
///
/// [`run_step`](super::run_step) drives every step the same way:
///
/// 1. Reuse a completed record whose artifacts are all on disk (when
///    `pipeline.reuse_existing` is set)
/// 2. `validate_input` - refuse without touching state
/// 3. Mark the record `in_progress`
/// 4. `execute` - generate, possibly writing partial records
/// 5. Mark the record `completed` with the returned output, or `failed`
///
/// # Example
///
/// ```ignore
/// struct ThumbnailStep;
///
/// impl PipelineStep for ThumbnailStep {
///     fn name(&self) -> StepName { StepName::Storyboard }
///
///     fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
///         let frames = ...;
///         Ok(serde_json::to_value(StoryboardOutput { frames })?)
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// The step this implementation records under.
    fn name(&self) -> StepName;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name().as_str()
    }

    /// Steps that must be `completed` before this one may start.
    fn predecessors(&self) -> &'static [StepName] {
        self.name().predecessors()
    }

    /// Check preconditions. Must not write state.
    ///
    /// The default refuses unless every predecessor is completed.
    fn validate_input(&self, _ctx: &Context, state: &StateStore) -> StepResult<()> {
        check_predecessors(self.name(), self.predecessors(), state)
    }

    /// Files that must exist for a completed record to be reused.
    ///
    /// An empty list means the step always recomputes.
    fn designated_artifacts(&self, _output: &Value) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Perform the step's work and return the output to record.
    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value>;
}

/// Refuse unless every step in `predecessors` is completed.
pub fn check_predecessors(
    step: StepName,
    predecessors: &[StepName],
    state: &StateStore,
) -> StepResult<()> {
    match predecessors.iter().find(|p| !state.is_completed(**p)) {
        Some(missing) => Err(StepError::missing_predecessor(step, *missing)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StepStatus;
    use tempfile::tempdir;

    struct NoopStep;

    impl PipelineStep for NoopStep {
        fn name(&self) -> StepName {
            StepName::Storyboard
        }

        fn execute(&self, _ctx: &Context, _state: &mut StateStore) -> StepResult<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn step_trait_object_uses_declared_graph() {
        let step: Box<dyn PipelineStep> = Box::new(NoopStep);
        assert_eq!(step.description(), "storyboard");
        assert_eq!(step.predecessors(), &[StepName::Assets, StepName::Analyze]);
        assert!(step.designated_artifacts(&Value::Null).is_empty());
    }

    #[test]
    fn predecessors_must_be_completed() {
        let dir = tempdir().unwrap();
        let mut state = StateStore::load(dir.path()).unwrap();
        let preds = [StepName::Assets, StepName::Analyze];

        let err = check_predecessors(StepName::Storyboard, &preds, &state).unwrap_err();
        assert!(err.is_precondition());

        state
            .update_step(StepName::Analyze, StepStatus::Completed, None)
            .unwrap();
        state
            .update_step(StepName::Assets, StepStatus::Failed, None)
            .unwrap();
        assert!(check_predecessors(StepName::Storyboard, &preds, &state).is_err());

        state
            .update_step(StepName::Assets, StepStatus::Completed, None)
            .unwrap();
        assert!(check_predecessors(StepName::Storyboard, &preds, &state).is_ok());
    }
}
