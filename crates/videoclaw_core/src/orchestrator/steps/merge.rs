//! Merge step - joins the clips and lays the music over them.
//!
//! Produces `videos/merged.mp4` (clips only) and `videos/final.mp4`.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::outputs::{AudioOutput, I2vOutput, MergeOutput};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::Context;
use crate::state::{StateStore, StepName};

use super::common::{path_string, predecessor_output, to_output};

const MERGED_FILE: &str = "merged.mp4";
const FINAL_FILE: &str = "final.mp4";

/// Merge step for the final video.
pub struct MergeStep;

impl MergeStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MergeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MergeStep {
    fn name(&self) -> StepName {
        StepName::Merge
    }

    fn description(&self) -> &str {
        "Merge clips and audio into the final video"
    }

    fn designated_artifacts(&self, output: &Value) -> Vec<PathBuf> {
        serde_json::from_value::<MergeOutput>(output.clone())
            .map(|out| vec![PathBuf::from(out.output_file)])
            .unwrap_or_default()
    }

    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Merge");

        let clips: I2vOutput = predecessor_output(state, StepName::I2v)?;
        let audio: AudioOutput = predecessor_output(state, StepName::Audio)?;

        if clips.videos.is_empty() {
            return Err(StepError::invalid_input("no video clips to merge"));
        }
        let inputs: Vec<PathBuf> = clips.videos.iter().map(|v| PathBuf::from(v.path())).collect();
        if let Some(missing) = inputs.iter().find(|p| !p.exists()) {
            return Err(StepError::file_not_found(path_string(missing)));
        }

        let videos_dir = ctx.layout.videos_dir();
        fs::create_dir_all(&videos_dir)
            .map_err(|e| StepError::io_error("creating videos directory", e))?;
        let merged = videos_dir.join(MERGED_FILE);
        let final_file = videos_dir.join(FINAL_FILE);

        ctx.logger
            .info(&format!("Concatenating {} clip(s)", inputs.len()));
        ctx.merger.concat(&inputs, &merged, &ctx.logger)?;

        match audio.bgm.map(PathBuf::from).filter(|p| p.exists()) {
            Some(bgm) => {
                ctx.logger.info(&format!("Adding music {}", bgm.display()));
                ctx.merger.add_audio(&merged, &bgm, &final_file, &ctx.logger)?;
            }
            None => {
                ctx.logger.info("No background music, using merged clips as final");
                fs::copy(&merged, &final_file)
                    .map_err(|e| StepError::io_error("copying merged video", e))?;
            }
        }

        if let Some(url) = ctx.uploader.upload_best_effort(&final_file, "videos") {
            ctx.logger.info(&format!("Uploaded {}", url));
        }

        to_output(&MergeOutput {
            output_file: path_string(&final_file),
        })
    }
}
