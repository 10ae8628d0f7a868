//! Audio step - narration per clip plus optional background music.

use std::path::PathBuf;

use serde_json::Value;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::outputs::{AudioOutput, Dialogue, I2vOutput, VideoClip};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::Context;
use crate::project::ArtifactKind;
use crate::state::{StateStore, StepName};

use super::common::{check_partial_success, predecessor_output, store_artifact, to_output};

/// Audio step for speech and music.
pub struct AudioStep;

impl AudioStep {
    pub fn new() -> Self {
        Self
    }

    fn generate_bgm(&self, ctx: &Context) -> StepResult<String> {
        let pipeline = &ctx.settings.pipeline;
        let generated = ctx
            .backends
            .audio
            .generate_bgm(&pipeline.bgm_style, pipeline.bgm_duration_secs)?;
        let dest = ctx.layout.artifact_path(ArtifactKind::Bgm, "", None, "mp3");
        store_artifact(ctx, &generated, &dest, "audio")
    }
}

impl Default for AudioStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AudioStep {
    fn name(&self) -> StepName {
        StepName::Audio
    }

    fn description(&self) -> &str {
        "Generate narration and background music"
    }

    fn designated_artifacts(&self, output: &Value) -> Vec<PathBuf> {
        serde_json::from_value::<AudioOutput>(output.clone())
            .map(|out| {
                out.dialogues
                    .iter()
                    .map(|d| PathBuf::from(&d.path))
                    .chain(out.bgm.iter().map(PathBuf::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Audio");

        let clips: I2vOutput = predecessor_output(state, StepName::I2v)?;
        let voice = &ctx.settings.models.audio.voice;
        let mut output = AudioOutput::default();
        let mut failed = Vec::new();

        for (idx, clip) in clips.videos.iter().enumerate() {
            let label = format!("line {}", idx);
            let dest = ctx
                .layout
                .artifact_path(ArtifactKind::Dialogue, &format!("{:03}", idx), None, "mp3");
            let stored = ctx
                .backends
                .audio
                .text_to_speech(clip.text(), voice)
                .map_err(StepError::from)
                .and_then(|generated| store_artifact(ctx, &generated, &dest, "audio"));

            match stored {
                Ok(path) => {
                    let (frame_id, index) = match clip {
                        VideoClip::Frame { frame_id, .. } => (Some(*frame_id), None),
                        VideoClip::Standalone { index, .. } => (None, Some(*index)),
                    };
                    output.dialogues.push(Dialogue {
                        frame_id,
                        index,
                        path,
                        text: clip.text().to_string(),
                    });
                }
                Err(e) => {
                    ctx.logger.warn(&format!("{} failed: {}", label, e));
                    failed.push(label);
                }
            }
        }
        check_partial_success(ctx, "dialogue lines", clips.videos.len(), &failed)?;

        if ctx.settings.pipeline.bgm_enabled {
            // Music is optional; the step still succeeds without it.
            match self.generate_bgm(ctx) {
                Ok(path) => {
                    ctx.logger.info(&format!("Background music -> {}", path));
                    output.bgm = Some(path);
                }
                Err(e) => ctx.logger.warn(&format!("Background music failed: {}", e)),
            }
        }

        to_output(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::orchestrator::pipeline::run_step;
    use crate::orchestrator::testing::{test_context, test_context_with, TestProject};
    use crate::state::StepStatus;
    use serde_json::json;

    fn with_clips(state: &mut StateStore) {
        state
            .update_step(
                StepName::I2v,
                StepStatus::Completed,
                Some(json!({"videos": [
                    {"frame_id": 1, "path": "video_000.mp4", "description": "The astronaut walks"},
                    {"index": 1, "path": "video_001.mp4", "prompt": "slow pan"}
                ]})),
            )
            .unwrap();
    }

    #[test]
    fn narrates_each_clip_and_adds_bgm() {
        let project = TestProject::new();
        let ctx = test_context(&project);
        let mut state = project.state();
        with_clips(&mut state);

        run_step(&AudioStep::new(), &ctx, &mut state);

        let out: AudioOutput = state.completed_output(StepName::Audio).unwrap().unwrap();
        assert_eq!(out.dialogues.len(), 2);
        assert_eq!(out.dialogues[0].frame_id, Some(1));
        assert_eq!(out.dialogues[1].index, Some(1));
        assert_eq!(out.dialogues[1].text, "slow pan");
        assert!(out.sfx.is_empty());

        let bgm = project.layout.artifact_path(ArtifactKind::Bgm, "", None, "mp3");
        assert_eq!(out.bgm, Some(bgm.display().to_string()));
        assert!(bgm.exists());
        assert_eq!(state.get_status(), "audio_generated");
    }

    #[test]
    fn bgm_can_be_disabled() {
        let project = TestProject::new();
        let mut settings = Settings::default();
        settings.pipeline.bgm_enabled = false;
        let ctx = test_context_with(&project, settings);
        let mut state = project.state();
        with_clips(&mut state);

        run_step(&AudioStep::new(), &ctx, &mut state);

        let record = state.get_step(StepName::Audio).unwrap();
        assert_eq!(record.output.as_ref().unwrap()["bgm"], Value::Null);
    }
}
