//! Pipeline runner that executes steps in sequence.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::state::{StateResult, StateStore, StepName, StepStatus};

use super::step::PipelineStep;
use super::types::{Context, PipelineReport, StepReport};

/// Run one step through the full step contract.
///
/// Never propagates: every outcome, including state write failures, comes
/// back as a [`StepReport`]. A precondition refusal leaves the state
/// document untouched.
pub fn run_step(step: &dyn PipelineStep, ctx: &Context, state: &mut StateStore) -> StepReport {
    let name = step.name();
    ctx.logger.phase(step.description());

    if ctx.settings.pipeline.reuse_existing {
        if let Some(output) = reusable_output(step, state) {
            ctx.logger
                .info(&format!("{} skipped: existing artifacts reused", name));
            return StepReport::skipped(output);
        }
    }

    if let Err(e) = step.validate_input(ctx, state) {
        ctx.logger.error(&e.to_string());
        return StepReport::refused(e.to_string());
    }

    if let Err(e) = begin(name, state) {
        let message = format!("Could not record start of {}: {}", name, e);
        ctx.logger.error(&message);
        record_failure(ctx, name, &message, state);
        return StepReport::failed(e.to_string());
    }

    ctx.logger.debug(&format!("Executing '{}'", name));
    match step.execute(ctx, state) {
        Ok(output) => match finish(name, output.clone(), state) {
            Ok(()) => {
                ctx.logger.success(&format!("{} completed", name));
                StepReport::success(output)
            }
            Err(e) => {
                let message = format!("Could not record result of {}: {}", name, e);
                ctx.logger.error(&message);
                record_failure(ctx, name, &message, state);
                StepReport::failed(e.to_string())
            }
        },
        Err(e) => {
            let message = e.to_string();
            ctx.logger.error(&format!("{} failed: {}", name, message));
            record_failure(ctx, name, &message, state);
            StepReport::failed(message)
        }
    }
}

/// Mark `name` failed so it is never left at `in_progress`.
///
/// The in-memory record is updated even when persisting it fails.
fn record_failure(ctx: &Context, name: StepName, message: &str, state: &mut StateStore) {
    if let Err(write_err) = fail(name, message, state) {
        ctx.logger
            .error(&format!("Could not record failure of {}: {}", name, write_err));
    }
}

fn reusable_output(step: &dyn PipelineStep, state: &StateStore) -> Option<Value> {
    let record = state.get_step(step.name())?;
    if record.status != StepStatus::Completed {
        return None;
    }
    let output = record.output.as_ref()?;
    let artifacts = step.designated_artifacts(output);
    if artifacts.is_empty() || !artifacts.iter().all(|p| p.exists()) {
        return None;
    }
    Some(output.clone())
}

fn begin(name: StepName, state: &mut StateStore) -> StateResult<()> {
    state.update_step(name, StepStatus::InProgress, None)?;
    state.set_status(name.running_label())
}

fn finish(name: StepName, output: Value, state: &mut StateStore) -> StateResult<()> {
    state.update_step(name, StepStatus::Completed, Some(output))?;
    state.set_status(name.completed_label())
}

fn fail(name: StepName, message: &str, state: &mut StateStore) -> StateResult<()> {
    state.update_step(name, StepStatus::Failed, Some(json!({ "error": message })))?;
    state.set_status(name.failed_label())
}

/// Pipeline that runs a sequence of steps.
pub struct Pipeline {
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a step to the pipeline.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run every step in order and collect one report per step.
    ///
    /// A failed step does not stop the run; later steps that depend on it
    /// refuse through their precondition check and are reported as failed.
    pub fn run(&self, ctx: &Context, state: &mut StateStore) -> PipelineReport {
        let total = self.steps.len().max(1);
        let mut results = BTreeMap::new();

        for (i, step) in self.steps.iter().enumerate() {
            let name = step.name();
            let percent = (i * 100 / total) as u32;
            ctx.report_progress(name, percent, &format!("Starting {}", name));

            let report = run_step(step.as_ref(), ctx, state);
            results.insert(name, report);
        }

        let report = PipelineReport::from_results(results);
        if let Some(last) = self.steps.last() {
            ctx.report_progress(last.name(), 100, "Pipeline finished");
        }
        let failed = report.failed_steps();
        if failed.is_empty() {
            ctx.logger.success("Pipeline completed successfully");
        } else {
            let names: Vec<&str> = failed.iter().map(StepName::as_str).collect();
            ctx.logger
                .error(&format!("Pipeline finished with failed steps: {}", names.join(", ")));
        }
        report
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<StepName> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
