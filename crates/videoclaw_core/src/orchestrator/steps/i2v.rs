//! Image-to-video step.
//!
//! Two modes:
//! - storyboard: one clip per rendered frame, prompted by its description
//! - standalone: clips from explicitly given images sharing one prompt,
//!   with no predecessor
//!
//! Clips are `videos/video_<idx:03>.mp4`, indexed from zero in input order.

use std::path::PathBuf;

use serde_json::Value;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::outputs::{I2vOutput, StoryboardOutput, VideoClip};
use crate::orchestrator::step::{check_predecessors, PipelineStep};
use crate::orchestrator::types::Context;
use crate::state::{StateStore, StepName};

use super::common::{check_partial_success, predecessor_output, store_artifact, to_output};

enum Source {
    Storyboard,
    Standalone { images: Vec<PathBuf>, prompt: String },
}

/// A clip to generate.
struct ClipJob {
    image: PathBuf,
    prompt: String,
    frame_id: Option<u32>,
}

/// I2V step for animating images.
pub struct I2vStep {
    source: Source,
}

impl I2vStep {
    /// Animate the storyboard frames.
    pub fn new() -> Self {
        Self {
            source: Source::Storyboard,
        }
    }

    /// Animate `images` with a shared `prompt`, independent of other steps.
    pub fn standalone(images: Vec<PathBuf>, prompt: impl Into<String>) -> Self {
        Self {
            source: Source::Standalone {
                images,
                prompt: prompt.into(),
            },
        }
    }

    fn jobs(&self, state: &StateStore) -> StepResult<Vec<ClipJob>> {
        match &self.source {
            Source::Storyboard => {
                let storyboard: StoryboardOutput = predecessor_output(state, StepName::Storyboard)?;
                Ok(storyboard
                    .frames
                    .into_iter()
                    .map(|f| ClipJob {
                        image: PathBuf::from(f.image.chosen()),
                        prompt: f.description,
                        frame_id: Some(f.frame_id),
                    })
                    .collect())
            }
            Source::Standalone { images, prompt } => Ok(images
                .iter()
                .map(|image| ClipJob {
                    image: image.clone(),
                    prompt: prompt.clone(),
                    frame_id: None,
                })
                .collect()),
        }
    }
}

impl Default for I2vStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for I2vStep {
    fn name(&self) -> StepName {
        StepName::I2v
    }

    fn description(&self) -> &str {
        "Generate video clips from images"
    }

    fn predecessors(&self) -> &'static [StepName] {
        match self.source {
            Source::Storyboard => StepName::I2v.predecessors(),
            Source::Standalone { .. } => &[],
        }
    }

    fn validate_input(&self, _ctx: &Context, state: &StateStore) -> StepResult<()> {
        if let Source::Standalone { images, prompt } = &self.source {
            if images.is_empty() {
                return Err(StepError::invalid_input("at least one image is required"));
            }
            if prompt.trim().is_empty() {
                return Err(StepError::invalid_input("prompt is empty"));
            }
        }
        check_predecessors(self.name(), self.predecessors(), state)
    }

    fn designated_artifacts(&self, output: &Value) -> Vec<PathBuf> {
        serde_json::from_value::<I2vOutput>(output.clone())
            .map(|out| out.videos.iter().map(|v| PathBuf::from(v.path())).collect())
            .unwrap_or_default()
    }

    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Image to Video");

        let jobs = self.jobs(state)?;
        let options = ctx.video_options();
        ctx.logger.info(&format!(
            "{} clip(s) at {} via {}",
            jobs.len(),
            options.resolution,
            ctx.backends.video.name()
        ));

        let mut output = I2vOutput::default();
        let mut failed = Vec::new();

        for (idx, job) in jobs.iter().enumerate() {
            let label = format!("clip {}", idx);
            if !job.image.exists() {
                ctx.logger.warn(&format!(
                    "{}: image {} not found, skipping",
                    label,
                    job.image.display()
                ));
                failed.push(label);
                continue;
            }

            let dest = ctx.layout.videos_dir().join(format!("video_{:03}.mp4", idx));
            let stored = ctx
                .backends
                .video
                .image_to_video(&job.image, &job.prompt, &options)
                .map_err(StepError::from)
                .and_then(|generated| store_artifact(ctx, &generated, &dest, "videos"));

            match stored {
                Ok(path) => {
                    ctx.logger.info(&format!("{} -> {}", label, path));
                    output.videos.push(match job.frame_id {
                        Some(frame_id) => VideoClip::Frame {
                            frame_id,
                            path,
                            description: job.prompt.clone(),
                        },
                        None => VideoClip::Standalone {
                            index: idx,
                            path,
                            prompt: job.prompt.clone(),
                        },
                    });
                }
                Err(e) => {
                    ctx.logger.warn(&format!("{} failed: {}", label, e));
                    failed.push(label);
                }
            }
        }

        check_partial_success(ctx, "video clips", jobs.len(), &failed)?;
        to_output(&output)
    }
}
