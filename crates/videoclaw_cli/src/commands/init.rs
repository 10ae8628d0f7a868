use std::path::Path;

use anyhow::{Context, Result};
use videoclaw_core::project::ProjectLayout;

use crate::app::App;

pub fn init(app: &App, name: &str, dir: Option<&Path>) -> Result<()> {
    let root = dir.unwrap_or(app.root());
    let layout = ProjectLayout::init(root, name)
        .with_context(|| format!("Failed to create project '{}'", name))?;

    println!("Created project '{}' at {}", name, layout.root().display());
    println!("Next: videoclaw analyze --project {} --script \"...\"", name);
    Ok(())
}
