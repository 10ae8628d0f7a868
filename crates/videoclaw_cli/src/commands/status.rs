use anyhow::{Context, Result};
use videoclaw_core::state::{StateStore, StepName};

use crate::app::App;

pub fn status(app: &App, project: &str, json: bool) -> Result<()> {
    let layout = app.open_project(project)?;
    let state = StateStore::load(layout.root())
        .with_context(|| format!("Failed to read state of '{}'", project))?;

    if json {
        println!("{}", serde_json::to_string_pretty(state.document())?);
        return Ok(());
    }

    let doc = state.document();
    println!("Project: {}", project);
    println!("Status:  {}", state.get_status());
    if let Some(ref created) = doc.created_at {
        println!("Created: {}", created);
    }
    println!();
    println!("Steps:");
    for step in StepName::ALL {
        match state.get_step(step) {
            Some(record) => println!(
                "  {:<12} {:<12} {}",
                step.as_str(),
                record.status.as_str(),
                record.updated_at
            ),
            None => println!("  {:<12} -", step.as_str()),
        }
    }

    if !doc.selections.is_empty() {
        println!();
        println!("Selections: {}", doc.selections.len());
        for (step, selection) in &doc.selections {
            println!(
                "  {:<12} {} ({} alternatives)",
                step.as_str(),
                selection.chosen,
                selection.alternatives.len()
            );
        }
    }
    Ok(())
}
