//! `videoclaw config`: read and edit TOML config files.

use anyhow::{anyhow, bail, Context as _, Result};
use videoclaw_core::config::ConfigFile;

use crate::app::App;

pub fn config(
    app: &App,
    project: Option<&str>,
    list: bool,
    get: Option<&str>,
    set: Option<&str>,
) -> Result<()> {
    let path = match project {
        Some(name) => app.open_project(name)?.config_file(),
        None => app
            .global_config()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| anyhow!("No home directory; pass --config or --project"))?,
    };
    let mut file = ConfigFile::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    if let Some(assignment) = set {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected KEY=VALUE, got '{}'", assignment))?;
        file.set(key.trim(), value.trim())?;
        file.save()?;
        println!("{} = {}", key.trim(), value.trim());
        return Ok(());
    }

    if let Some(key) = get {
        match file.get(key) {
            Some(value) => println!("{}", value),
            None => bail!("Key '{}' is not set in {}", key, path.display()),
        }
        return Ok(());
    }

    if list {
        for (key, value) in file.entries() {
            println!("{} = {}", key, value);
        }
    } else {
        println!("# {}", path.display());
        print!("{}", file.render());
    }
    Ok(())
}
