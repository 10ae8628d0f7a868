//! Storyboard step - one image per planned frame.
//!
//! A frame whose description names a character that has an asset image is
//! rendered image-to-image from that reference, keeping the character
//! consistent across frames. Other frames are text-to-image.

use std::path::PathBuf;

use serde_json::Value;

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::outputs::{
    AnalysisOutput, AssetsOutput, FrameImage, FramePlan, StoryboardFrame, StoryboardOutput,
};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::Context;
use crate::orchestrator::variants::{produce_item, ItemOutcome};
use crate::project::ArtifactKind;
use crate::state::{StateStore, StepName, StepStatus};

use super::common::{check_partial_success, predecessor_output, store_artifact, to_output};

/// Storyboard step for rendering frames.
pub struct StoryboardStep;

impl StoryboardStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StoryboardStep {
    fn default() -> Self {
        Self::new()
    }
}

/// Chosen asset image of the first character named in `frame`.
fn reference_for(frame: &FramePlan, analysis: &AnalysisOutput, assets: &AssetsOutput) -> Option<PathBuf> {
    analysis
        .characters
        .iter()
        .filter(|c| frame.description.contains(&c.name))
        .find_map(|c| assets.characters.get(&c.name))
        .map(|candidates| PathBuf::from(candidates.chosen()))
        .filter(|path| path.exists())
}

fn frame_prompt(frame: &FramePlan, analysis: &AnalysisOutput) -> String {
    let mut prompt = frame.description.clone();
    if let Some(scene) = analysis.scenes.first() {
        prompt.push_str(", ");
        prompt.push_str(&scene.description);
    }
    if let Some(camera) = &frame.camera {
        prompt.push_str(", ");
        prompt.push_str(camera);
    }
    prompt
}

fn upsert(frames: &mut Vec<StoryboardFrame>, frame: StoryboardFrame) {
    frames.retain(|f| f.frame_id != frame.frame_id);
    frames.push(frame);
}

impl PipelineStep for StoryboardStep {
    fn name(&self) -> StepName {
        StepName::Storyboard
    }

    fn description(&self) -> &str {
        "Render storyboard frames"
    }

    fn designated_artifacts(&self, output: &Value) -> Vec<PathBuf> {
        serde_json::from_value::<StoryboardOutput>(output.clone())
            .map(|sb| {
                sb.frames
                    .iter()
                    .map(|f| PathBuf::from(f.image.chosen()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Storyboard");

        let analysis: AnalysisOutput = predecessor_output(state, StepName::Analyze)?;
        let assets: AssetsOutput = predecessor_output(state, StepName::Assets)?;
        let requested = ctx.num_variants();

        let mut output = StoryboardOutput::default();
        let mut attempted = 0;
        let mut failed = Vec::new();
        let mut alternatives = Vec::new();

        for plan in &analysis.frames {
            let label = format!("frame {}", plan.frame_id);
            let name = format!("{:03}", plan.frame_id);
            let reference = reference_for(plan, &analysis, &assets);
            match &reference {
                Some(path) => ctx
                    .logger
                    .debug(&format!("{} uses reference {}", label, path.display())),
                None => ctx.logger.debug(&format!("{} has no reference image", label)),
            }

            let outcome = produce_item(
                &ctx.logger,
                ctx.confirmer(),
                &label,
                &frame_prompt(plan, &analysis),
                requested,
                |prompt, variant| {
                    let generated = match reference.as_deref() {
                        Some(path) => ctx.backends.image.image_to_image(path, prompt)?,
                        None => ctx.backends.image.text_to_image(prompt)?,
                    };
                    let dest = ctx
                        .layout
                        .artifact_path(ArtifactKind::Frame, &name, variant, "png");
                    store_artifact(ctx, &generated, &dest, "storyboard")
                },
                |first| {
                    upsert(
                        &mut output.frames,
                        StoryboardFrame {
                            frame_id: plan.frame_id,
                            image: FrameImage::Single {
                                path: first.to_string(),
                            },
                            description: plan.description.clone(),
                        },
                    );
                    state.update_step(
                        StepName::Storyboard,
                        StepStatus::InProgress,
                        Some(to_output(&output)?),
                    )?;
                    Ok(())
                },
            )?;

            match outcome {
                ItemOutcome::Finalized(candidates) => {
                    attempted += 1;
                    if candidates.has_variants() {
                        alternatives.extend(candidates.all());
                        state.update_selection(
                            StepName::Storyboard,
                            candidates.chosen(),
                            alternatives.clone(),
                        )?;
                    }
                    upsert(
                        &mut output.frames,
                        StoryboardFrame {
                            frame_id: plan.frame_id,
                            image: candidates.into(),
                            description: plan.description.clone(),
                        },
                    );
                }
                ItemOutcome::Rejected => {
                    let before = output.frames.len();
                    output.frames.retain(|f| f.frame_id != plan.frame_id);
                    if output.frames.len() != before {
                        state.update_step(
                            StepName::Storyboard,
                            StepStatus::InProgress,
                            Some(to_output(&output)?),
                        )?;
                    }
                }
                ItemOutcome::Failed => {
                    attempted += 1;
                    output.frames.retain(|f| f.frame_id != plan.frame_id);
                    failed.push(label);
                }
            }
        }

        check_partial_success(ctx, "storyboard frames", attempted, &failed)?;
        ctx.logger
            .info(&format!("{} frame(s) rendered", output.frames.len()));
        to_output(&output)
    }
}
