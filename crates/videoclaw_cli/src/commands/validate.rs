use anyhow::{bail, Result};
use videoclaw_core::project::validate_state;

use crate::app::App;

pub fn validate(app: &App, project: &str, strict: bool) -> Result<()> {
    let layout = app.open_project(project)?;
    let report = validate_state(&layout.state_file(), strict)?;

    for error in &report.errors {
        println!("error: {}", error);
    }
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
    if let Some(ref preview) = report.script_preview {
        println!("Script:     {}", preview);
    }
    let counts = [
        ("Characters", report.characters),
        ("Scenes", report.scenes),
        ("Frames", report.frames),
    ];
    for (label, count) in counts {
        if let Some(n) = count {
            println!("{:<11} {}", format!("{}:", label), n);
        }
    }

    if !report.is_valid() {
        bail!("State of '{}' is invalid ({} error(s))", project, report.errors.len());
    }
    println!("State of '{}' is valid", project);
    Ok(())
}
