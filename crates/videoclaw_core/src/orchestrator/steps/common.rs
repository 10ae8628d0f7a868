//! Helpers shared by the generating steps.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::providers::GenerationResult;
use crate::state::{StateStore, StepName};

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::types::Context;

/// Move a backend's output to its durable location and upload it.
///
/// Returns the stored path as recorded in step outputs.
pub fn store_artifact(
    ctx: &Context,
    generated: &GenerationResult,
    dest: &Path,
    category: &str,
) -> StepResult<String> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| StepError::io_error(format!("creating {}", parent.display()), e))?;
    }

    // Scratch and project may sit on different filesystems.
    if fs::rename(&generated.local_path, dest).is_err() {
        fs::copy(&generated.local_path, dest).map_err(|e| {
            StepError::io_error(format!("copying artifact to {}", dest.display()), e)
        })?;
        let _ = fs::remove_file(&generated.local_path);
    }

    if let Some(url) = ctx.uploader.upload_best_effort(dest, category) {
        ctx.logger.info(&format!("Uploaded {}", url));
    }

    Ok(path_string(dest))
}

pub fn path_string(path: &Path) -> String {
    path.display().to_string()
}

/// Typed output of a completed predecessor.
pub fn predecessor_output<T: DeserializeOwned>(state: &StateStore, step: StepName) -> StepResult<T> {
    state
        .completed_output(step)?
        .ok_or_else(|| StepError::parse_error(format!("{} output", step), "no output recorded"))
}

/// Serialize a step output for recording.
pub fn to_output<T: Serialize>(output: &T) -> StepResult<Value> {
    serde_json::to_value(output).map_err(|e| StepError::parse_error("step output", e.to_string()))
}

/// Log the per-item tally and fail only if nothing was produced.
///
/// Rejected items are not attempts.
pub fn check_partial_success(
    ctx: &Context,
    what: &str,
    attempted: usize,
    failed: &[String],
) -> StepResult<()> {
    if failed.is_empty() {
        return Ok(());
    }
    ctx.logger.warn(&format!(
        "{} of {} {} failed: {}",
        failed.len(),
        attempted,
        what,
        failed.join(", ")
    ));
    if failed.len() == attempted {
        return Err(StepError::AllItemsFailed {
            what: what.to_string(),
            attempted,
        });
    }
    Ok(())
}
