//! Comment-preserving edits of a single config file.
//!
//! Backs the `config --get/--set/--list` commands. Writes are atomic
//! (temp file, then rename) and leave unrelated keys and comments intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table};

use super::manager::{ConfigError, ConfigResult};
use super::settings::Settings;

/// One editable TOML config file.
pub struct ConfigFile {
    path: PathBuf,
    doc: DocumentMut,
}

impl ConfigFile {
    /// Open a config file; a missing file starts as an empty document.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
                path: path.clone(),
                source,
            })?;
            content.parse::<DocumentMut>()?
        } else {
            DocumentMut::new()
        };
        Ok(Self { path, doc })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value at a dotted key, rendered as text (strings unquoted).
    pub fn get(&self, key: &str) -> Option<String> {
        let mut item = self.doc.as_item();
        for part in key.split('.') {
            item = item.get(part)?;
        }
        if let Some(s) = item.as_str() {
            return Some(s.to_string());
        }
        if item.is_table_like() {
            return Some(render_table(item));
        }
        Some(item.to_string().trim().to_string())
    }

    /// Set a dotted key, creating intermediate tables as needed.
    ///
    /// `raw` is typed by shape: booleans, integers and floats are stored as
    /// such, anything else as a string.
    pub fn set(&mut self, key: &str, raw: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let Some((leaf, parents)) = parts.split_last() else {
            return Err(ConfigError::InvalidKey(key.to_string()));
        };
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }

        let mut table: &mut Table = self.doc.as_table_mut();
        for part in parents {
            let entry = table.entry(part).or_insert_with(|| {
                let mut t = Table::new();
                t.set_implicit(true);
                Item::Table(t)
            });
            table = entry
                .as_table_mut()
                .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        }

        if table.get(leaf).is_some_and(Item::is_table_like) {
            return Err(ConfigError::InvalidKey(key.to_string()));
        }
        table.insert(leaf, toml_edit::value(parse_value(raw)));
        Ok(())
    }

    /// Whole document as written on disk.
    pub fn render(&self) -> String {
        self.doc.to_string()
    }

    /// Every leaf as `(dotted.key, value)` in document order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        collect_entries(self.doc.as_table(), "", &mut out);
        out
    }

    /// Write the document back atomically.
    pub fn save(&self) -> ConfigResult<()> {
        atomic_write(&self.path, &self.doc.to_string()).map_err(|source| {
            ConfigError::WriteError {
                path: self.path.clone(),
                source,
            }
        })
    }
}

/// Write a commented default project config.
pub fn write_default_config(path: &Path, settings: &Settings) -> ConfigResult<()> {
    let content = generate_config_with_comments(settings)?;
    atomic_write(path, &content).map_err(|source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

fn generate_config_with_comments(settings: &Settings) -> ConfigResult<String> {
    let mut output = String::new();
    output.push_str("# videoclaw project configuration\n");
    output.push_str("# Keys here override ~/.videoclaw/config.toml; VIDEOCLAW_* variables override both.\n\n");

    push_section(&mut output, "Project identity", "project", &toml::to_string_pretty(&settings.project)?);
    push_section(
        &mut output,
        "Text-to-image backend",
        "models.image",
        &toml::to_string_pretty(&settings.models.image)?,
    );
    push_section(
        &mut output,
        "Image-to-video backend",
        "models.video",
        &toml::to_string_pretty(&settings.models.video)?,
    );
    push_section(
        &mut output,
        "Speech and music backend",
        "models.audio",
        &toml::to_string_pretty(&settings.models.audio)?,
    );
    push_section(&mut output, "Artifact upload", "storage", &toml::to_string_pretty(&settings.storage)?);
    push_section(&mut output, "Logging", "logging", &toml::to_string_pretty(&settings.logging)?);
    push_section(&mut output, "Pipeline behaviour", "pipeline", &toml::to_string_pretty(&settings.pipeline)?);
    push_section(&mut output, "External tools", "ffmpeg", &toml::to_string_pretty(&settings.ffmpeg)?);

    Ok(output)
}

fn push_section(output: &mut String, comment: &str, header: &str, body: &str) {
    output.push_str(&format!("# {}\n[{}]\n", comment, header));
    for line in body.lines() {
        output.push_str(line);
        output.push('\n');
    }
    output.push('\n');
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

fn parse_value(raw: &str) -> toml_edit::Value {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return true.into(),
        "false" => return false.into(),
        _ => {}
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return i.into();
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if trimmed.contains('.') {
            return f.into();
        }
    }
    raw.into()
}

fn render_table(item: &Item) -> String {
    let mut out = Vec::new();
    if let Some(table) = item.as_table() {
        collect_entries(table, "", &mut out);
    } else if let Some(inline) = item.as_inline_table() {
        for (k, v) in inline.iter() {
            out.push((k.to_string(), v.to_string().trim().to_string()));
        }
    }
    out.into_iter()
        .map(|(k, v)| format!("{} = {}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_entries(table: &Table, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, item) in table.iter() {
        let dotted = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };
        match item {
            Item::Table(nested) => collect_entries(nested, &dotted, out),
            Item::Value(value) => {
                let text = match value.as_str() {
                    Some(s) => s.to_string(),
                    None => value.to_string().trim().to_string(),
                };
                out.push((dotted, text));
            }
            _ => {}
        }
    }
}
