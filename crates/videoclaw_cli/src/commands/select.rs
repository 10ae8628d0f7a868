//! Variant selection subcommands.

use anyhow::{anyhow, Context as _, Result};
use videoclaw_core::orchestrator::select_artifact;
use videoclaw_core::state::{StateStore, StepName};

use crate::app::App;

pub fn select(app: &App, project: &str, step: &str, artifact: &str) -> Result<()> {
    let step: StepName = step.parse().map_err(|e: String| anyhow!(e))?;
    let layout = app.open_project(project)?;
    let mut state = StateStore::load(layout.root())
        .with_context(|| format!("Failed to read state of '{}'", project))?;

    let variants = select_artifact(&mut state, step, artifact)?;
    println!("{}: chose {}", step, artifact);
    for variant in variants {
        let marker = if variant == artifact { "*" } else { " " };
        println!("  {} {}", marker, variant);
    }
    Ok(())
}

pub fn alternatives(app: &App, project: &str) -> Result<()> {
    let layout = app.open_project(project)?;
    let state = StateStore::load(layout.root())
        .with_context(|| format!("Failed to read state of '{}'", project))?;

    let alternatives = state.get_all_alternatives();
    if alternatives.is_empty() {
        println!("No alternatives recorded");
    }
    for path in alternatives {
        println!("{}", path);
    }
    Ok(())
}
