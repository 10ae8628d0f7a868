//! Pipeline step subcommands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use videoclaw_core::orchestrator::{
    create_standard_pipeline, run_step, AnalyzeStep, AssetsStep, AudioStep, I2vStep, MergeStep,
    PipelineStep, ReportStatus, StepReport, StoryboardStep,
};
use videoclaw_core::state::{StateStore, StepName};

use crate::app::{App, MediaKind};
use crate::cli::{ScriptArgs, StepArgs};

fn read_script(args: &ScriptArgs) -> Result<String> {
    match (&args.script, &args.script_file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display())),
        (None, None) => bail!("either --script or --script-file is required"),
    }
}

/// Run one step through the orchestrator and turn a failure into an error.
fn execute(
    app: &App,
    args: &StepArgs,
    kind: Option<MediaKind>,
    step: &dyn PipelineStep,
) -> Result<()> {
    let layout = app.open_project(&args.project)?;
    let settings = app.step_settings(&layout, args, kind)?;
    let mut state = StateStore::load(layout.root())
        .with_context(|| format!("Failed to read state of '{}'", args.project))?;
    let ctx = app.context(layout, settings)?;

    let report = run_step(step, &ctx, &mut state);
    print_report(step.name().as_str(), &report);

    if report.is_failed() {
        let reason = report.error.unwrap_or_default();
        if report.refused {
            bail!("{} refused: {}", step.name(), reason);
        }
        bail!("{} failed: {}", step.name(), reason);
    }
    Ok(())
}

fn print_report(name: &str, report: &StepReport) {
    match report.status {
        ReportStatus::Success => println!("{}: done", name),
        ReportStatus::Skipped => println!("{}: skipped (existing artifacts reused)", name),
        ReportStatus::Failed => println!("{}: failed", name),
    }
}

pub fn analyze(app: &App, args: &StepArgs, script: &ScriptArgs) -> Result<()> {
    let script = read_script(script)?;
    execute(app, args, None, &AnalyzeStep::new(script))
}

pub fn assets(app: &App, args: &StepArgs) -> Result<()> {
    execute(app, args, Some(MediaKind::Image), &AssetsStep::new())
}

pub fn storyboard(app: &App, args: &StepArgs) -> Result<()> {
    execute(app, args, Some(MediaKind::Image), &StoryboardStep::new())
}

pub fn i2v(app: &App, args: &StepArgs, images: Vec<PathBuf>, prompt: Option<String>) -> Result<()> {
    let step = if images.is_empty() {
        I2vStep::new()
    } else {
        I2vStep::standalone(images, prompt.unwrap_or_default())
    };
    execute(app, args, Some(MediaKind::Video), &step)
}

pub fn audio(app: &App, args: &StepArgs) -> Result<()> {
    execute(app, args, Some(MediaKind::Audio), &AudioStep::new())
}

pub fn merge(app: &App, args: &StepArgs) -> Result<()> {
    execute(app, args, None, &MergeStep::new())
}

pub fn run(app: &App, args: &StepArgs, script: &ScriptArgs, json: bool) -> Result<()> {
    let script = read_script(script)?;
    let layout = app.open_project(&args.project)?;
    let settings = app.step_settings(&layout, args, None)?;
    let mut state = StateStore::load(layout.root())
        .with_context(|| format!("Failed to read state of '{}'", args.project))?;
    let ctx = app
        .context(layout, settings)?
        .with_progress_callback(Box::new(|step: StepName, percent: u32, message: &str| {
            eprintln!("[{:>3}%] {}: {}", percent, step, message)
        }));

    let report = create_standard_pipeline(script).run(&ctx, &mut state);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (step, step_report) in &report.results {
            print_report(step.as_str(), step_report);
            if let Some(ref error) = step_report.error {
                println!("  {}", error);
            }
        }
        println!("pipeline: {}", report.status);
    }

    let failed = report.failed_steps();
    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|s| s.as_str()).collect();
        bail!("pipeline failed at: {}", names.join(", "));
    }
    Ok(())
}
