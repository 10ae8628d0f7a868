//! Assets step - one reference image per character and scene.
//!
//! Every item gets up to `pipeline.num_variants` candidates. The first
//! candidate is written into the in-progress record as soon as it exists,
//! so an interrupted run still leaves usable paths behind.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::orchestrator::errors::StepResult;
use crate::orchestrator::outputs::{AnalysisOutput, AssetsOutput};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::Context;
use crate::orchestrator::variants::{produce_item, Candidates, ItemOutcome};
use crate::project::ArtifactKind;
use crate::state::{StateStore, StepName, StepStatus};

use super::common::{check_partial_success, predecessor_output, store_artifact, to_output};

/// Assets step for character and scene images.
pub struct AssetsStep;

impl AssetsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssetsStep {
    fn default() -> Self {
        Self::new()
    }
}

/// One image to produce.
struct AssetItem {
    kind: ArtifactKind,
    name: String,
    prompt: String,
}

/// Running totals for one invocation.
#[derive(Default)]
struct Tally {
    attempted: usize,
    failed: Vec<String>,
    alternatives: Vec<String>,
}

impl PipelineStep for AssetsStep {
    fn name(&self) -> StepName {
        StepName::Assets
    }

    fn description(&self) -> &str {
        "Generate character and scene images"
    }

    fn designated_artifacts(&self, output: &Value) -> Vec<PathBuf> {
        serde_json::from_value::<AssetsOutput>(output.clone())
            .map(|assets| {
                assets
                    .characters
                    .values()
                    .chain(assets.scenes.values())
                    .map(|c| PathBuf::from(c.chosen()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn execute(&self, ctx: &Context, state: &mut StateStore) -> StepResult<Value> {
        ctx.logger.section("Asset Generation");

        let analysis: AnalysisOutput = predecessor_output(state, StepName::Analyze)?;
        let requested = ctx.num_variants();
        ctx.logger.info(&format!(
            "{} character(s), {} scene(s), {} candidate(s) each",
            analysis.characters.len(),
            analysis.scenes.len(),
            requested
        ));

        let items = analysis
            .characters
            .iter()
            .map(|c| AssetItem {
                kind: ArtifactKind::Character,
                name: c.name.clone(),
                prompt: format!("{}, {}, character design, full body", c.name, c.description),
            })
            .chain(analysis.scenes.iter().map(|s| AssetItem {
                kind: ArtifactKind::Scene,
                name: s.name.clone(),
                prompt: format!("{}, {}, {}", s.name, s.description, s.time),
            }));

        let mut output = AssetsOutput::default();
        let mut tally = Tally::default();

        for item in items {
            let label = format!("{} {}", item.kind.prefix(), item.name);
            let outcome = produce_item(
                &ctx.logger,
                ctx.confirmer(),
                &label,
                &item.prompt,
                requested,
                |prompt, variant| {
                    let generated = ctx.backends.image.text_to_image(prompt)?;
                    let dest = ctx
                        .layout
                        .artifact_path(item.kind, &item.name, variant, "png");
                    store_artifact(ctx, &generated, &dest, "assets")
                },
                |first| {
                    group_mut(&mut output, item.kind)
                        .insert(item.name.clone(), Candidates::Single(first.to_string()));
                    state.update_step(
                        StepName::Assets,
                        StepStatus::InProgress,
                        Some(to_output(&output)?),
                    )?;
                    Ok(())
                },
            )?;

            match outcome {
                ItemOutcome::Finalized(candidates) => {
                    tally.attempted += 1;
                    if candidates.has_variants() {
                        tally.alternatives.extend(candidates.all());
                        state.update_selection(
                            StepName::Assets,
                            candidates.chosen(),
                            tally.alternatives.clone(),
                        )?;
                    }
                    ctx.logger
                        .info(&format!("{} -> {}", label, candidates.chosen()));
                    group_mut(&mut output, item.kind).insert(item.name, candidates);
                }
                ItemOutcome::Rejected => {
                    if group_mut(&mut output, item.kind).remove(&item.name).is_some() {
                        state.update_step(
                            StepName::Assets,
                            StepStatus::InProgress,
                            Some(to_output(&output)?),
                        )?;
                    }
                }
                ItemOutcome::Failed => {
                    tally.attempted += 1;
                    group_mut(&mut output, item.kind).remove(&item.name);
                    tally.failed.push(label);
                }
            }
        }

        check_partial_success(ctx, "assets", tally.attempted, &tally.failed)?;
        to_output(&output)
    }
}

fn group_mut(output: &mut AssetsOutput, kind: ArtifactKind) -> &mut BTreeMap<String, Candidates> {
    match kind {
        ArtifactKind::Scene => &mut output.scenes,
        _ => &mut output.characters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::orchestrator::confirm::{Decision, ScriptedConfirmer};
    use crate::orchestrator::pipeline::run_step;
    use crate::orchestrator::steps::AnalyzeStep;
    use crate::orchestrator::testing::{test_context, test_context_with, TestProject};
    use crate::orchestrator::types::ReportStatus;
    use crate::providers::{
        GenerationResult, ImageBackend, MockImageBackend, ProviderError, ProviderResult,
    };
    use crate::state::StateDocument;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    /// Fails prompts for one subject and snapshots the state file on every call.
    struct FlakyImages {
        inner: MockImageBackend,
        fail_on: &'static str,
        state_file: PathBuf,
        snapshots: Arc<Mutex<Vec<StateDocument>>>,
    }

    impl ImageBackend for FlakyImages {
        fn name(&self) -> &str {
            "flaky"
        }

        fn text_to_image(&self, prompt: &str) -> ProviderResult<GenerationResult> {
            let text = fs::read_to_string(&self.state_file).unwrap();
            self.snapshots.lock().push(serde_json::from_str(&text).unwrap());
            if prompt.starts_with(self.fail_on) {
                return Err(ProviderError::generation("flaky", "quota exceeded"));
            }
            self.inner.text_to_image(prompt)
        }

        fn image_to_image(&self, reference: &Path, prompt: &str) -> ProviderResult<GenerationResult> {
            self.inner.image_to_image(reference, prompt)
        }
    }

    fn analyzed(project: &TestProject, ctx: &Context, script: &str) -> StateStore {
        let mut state = project.state();
        run_step(&AnalyzeStep::new(script), ctx, &mut state);
        state
    }

    #[test]
    fn refused_before_analyze() {
        let project = TestProject::new();
        let ctx = test_context(&project);
        let mut state = project.state();

        let report = run_step(&AssetsStep::new(), &ctx, &mut state);
        assert!(report.refused);
        assert!(state.get_step(StepName::Assets).is_none());
    }

    #[test]
    fn single_candidate_records_bare_paths() {
        let project = TestProject::new();
        let ctx = test_context(&project);
        let mut state = analyzed(&project, &ctx, "astronaut on mars");

        let report = run_step(&AssetsStep::new(), &ctx, &mut state);
        assert_eq!(report.status, ReportStatus::Success);

        let output = state.get_step(StepName::Assets).unwrap().output.clone().unwrap();
        let hero = project
            .layout
            .artifact_path(ArtifactKind::Character, "astronaut", None, "png");
        assert_eq!(output["characters"]["astronaut"], json!(hero.display().to_string()));
        assert!(hero.exists());
        assert!(output["scenes"]["mars surface"].is_string());
        assert!(state.get_selection(StepName::Assets).is_none());
    }

    #[test]
    fn variants_record_composite_and_selection() {
        let project = TestProject::new();
        let mut settings = Settings::default();
        settings.pipeline.num_variants = 3;
        let ctx = test_context_with(&project, settings);
        let mut state = analyzed(&project, &ctx, "astronaut meets a robot");

        run_step(&AssetsStep::new(), &ctx, &mut state);

        let assets: AssetsOutput = state.completed_output(StepName::Assets).unwrap().unwrap();
        let path = |i| {
            project
                .layout
                .artifact_path(ArtifactKind::Character, "astronaut", Some(i), "png")
                .display()
                .to_string()
        };
        assert_eq!(
            assets.characters["astronaut"],
            Candidates::Variants {
                chosen: path(1),
                variants: vec![path(1), path(2), path(3)],
            }
        );

        // Two characters plus one scene, three candidates each.
        assert_eq!(state.get_all_alternatives().len(), 9);
        let selection = state.get_selection(StepName::Assets).unwrap();
        assert!(selection.chosen.contains("scene_scene_1"));
    }

    #[test]
    fn designated_artifacts_are_chosen_paths() {
        let step = AssetsStep::new();
        let output = json!({
            "characters": {"a": "a.png", "b": {"chosen": "b_2.png", "variants": ["b_1.png", "b_2.png"]}},
            "scenes": {"s": "s.png"}
        });
        let paths = step.designated_artifacts(&output);
        assert_eq!(
            paths,
            vec![PathBuf::from("a.png"), PathBuf::from("b_2.png"), PathBuf::from("s.png")]
        );
    }

    #[test]
    fn rejected_items_are_left_out() {
        let project = TestProject::new();
        let mut settings = Settings::default();
        settings.pipeline.interactive = true;
        let ctx = test_context_with(&project, settings).with_confirmer(Box::new(
            ScriptedConfirmer::new(vec![Decision::Reject, Decision::Accept]),
        ));
        let mut state = analyzed(&project, &ctx, "astronaut on mars");

        let report = run_step(&AssetsStep::new(), &ctx, &mut state);
        assert_eq!(report.status, ReportStatus::Success);

        let assets: AssetsOutput = state.completed_output(StepName::Assets).unwrap().unwrap();
        assert!(assets.characters.is_empty());
        assert_eq!(assets.scenes.len(), 1);
        assert!(!project
            .layout
            .artifact_path(ArtifactKind::Character, "astronaut", None, "png")
            .exists());
    }

    #[test]
    fn partial_record_is_on_disk_and_failed_items_are_left_out() {
        let project = TestProject::new();
        let mut ctx = test_context(&project);
        let mut state = analyzed(&project, &ctx, "astronaut meets a robot on mars");
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        ctx.backends.image = Box::new(FlakyImages {
            inner: MockImageBackend::new("mock", project.layout.scratch_dir()),
            fail_on: "transformer",
            state_file: project.layout.state_file(),
            snapshots: Arc::clone(&snapshots),
        });

        let report = run_step(&AssetsStep::new(), &ctx, &mut state);
        assert_eq!(report.status, ReportStatus::Success, "{:?}", report);

        // astronaut, transformer, mars surface
        let snapshots = snapshots.lock();
        assert_eq!(snapshots.len(), 3);
        let hero = project
            .layout
            .artifact_path(ArtifactKind::Character, "astronaut", None, "png")
            .display()
            .to_string();
        let during = &snapshots[1].steps[&StepName::Assets];
        assert_eq!(during.status, StepStatus::InProgress);
        assert_eq!(
            during.output.as_ref().unwrap()["characters"]["astronaut"],
            json!(hero)
        );

        let record = state.get_step(StepName::Assets).unwrap();
        assert_eq!(record.status, StepStatus::Completed);
        let assets: AssetsOutput = state.completed_output(StepName::Assets).unwrap().unwrap();
        assert_eq!(assets.characters.keys().collect::<Vec<_>>(), vec!["astronaut"]);
        assert!(assets.scenes.contains_key("mars surface"));
    }

    #[test]
    fn interactive_review_keeps_requested_variant_count() {
        let project = TestProject::new();
        let mut settings = Settings::default();
        settings.pipeline.num_variants = 3;
        settings.pipeline.interactive = true;
        let ctx = test_context_with(&project, settings).with_confirmer(Box::new(
            ScriptedConfirmer::new(vec![Decision::Accept, Decision::Accept]),
        ));
        let mut state = analyzed(&project, &ctx, "astronaut on mars");

        let report = run_step(&AssetsStep::new(), &ctx, &mut state);
        assert_eq!(report.status, ReportStatus::Success);

        let assets: AssetsOutput = state.completed_output(StepName::Assets).unwrap().unwrap();
        for candidates in assets.characters.values().chain(assets.scenes.values()) {
            assert!(candidates.has_variants(), "{:?}", candidates);
            assert_eq!(candidates.all().len(), 3);
        }
        let selection = state.get_selection(StepName::Assets).unwrap();
        assert_eq!(selection.alternatives.len(), 6);
    }

    #[test]
    fn rejected_item_is_dropped_from_in_progress_record() {
        let project = TestProject::new();
        let mut settings = Settings::default();
        settings.pipeline.interactive = true;
        let mut ctx = test_context_with(&project, settings).with_confirmer(Box::new(
            ScriptedConfirmer::new(vec![Decision::Reject]),
        ));
        let mut state = analyzed(&project, &ctx, "astronaut on mars");
        let snapshots = Arc::new(Mutex::new(Vec::new()));
        ctx.backends.image = Box::new(FlakyImages {
            inner: MockImageBackend::new("mock", project.layout.scratch_dir()),
            fail_on: "nothing matches this",
            state_file: project.layout.state_file(),
            snapshots: Arc::clone(&snapshots),
        });

        run_step(&AssetsStep::new(), &ctx, &mut state);

        // Rendering the scene happens after the astronaut was rejected.
        let snapshots = snapshots.lock();
        let during = &snapshots[1].steps[&StepName::Assets];
        assert_eq!(during.status, StepStatus::InProgress);
        assert_eq!(during.output.as_ref().unwrap()["characters"], json!({}));
    }
}
