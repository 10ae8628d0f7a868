//! Standalone `t2i`, `i2i` and `upload`: one call against a backend, no project.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use videoclaw_core::providers::{image_backend, GenerationResult, ImageBackend};
use videoclaw_core::storage::storage_backend;

use crate::app::App;

pub fn t2i(
    app: &App,
    prompt: &str,
    output: &Path,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let backend = backend_for(app, output, provider, model)?;
    let generated = backend
        .text_to_image(prompt)
        .with_context(|| format!("{} text-to-image failed", backend.name()))?;
    write_output(&generated, output)
}

pub fn i2i(
    app: &App,
    input: &Path,
    prompt: &str,
    output: &Path,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    if !input.is_file() {
        bail!("Input image not found: {}", input.display());
    }
    let backend = backend_for(app, output, provider, model)?;
    let generated = backend
        .image_to_image(input, prompt)
        .with_context(|| format!("{} image-to-image failed", backend.name()))?;
    write_output(&generated, output)
}

pub fn upload(app: &App, input: &Path, remote: &str, provider: Option<String>) -> Result<()> {
    if !input.is_file() {
        bail!("File not found: {}", input.display());
    }
    let mut storage = app.global_settings()?.storage;
    if let Some(provider) = provider {
        storage.provider = provider;
    }
    let backend = storage_backend(&storage).context("Storage is not usable")?;

    println!("Uploading {} -> {}", input.display(), remote);
    let url = backend
        .upload(input, remote)
        .with_context(|| format!("Upload of {} failed", input.display()))?;
    println!("Uploaded: {}", url);
    Ok(())
}

/// Image backend from flags, falling back to the `models.image` section.
///
/// Scratch output lands beside `output` so the final move is a rename.
fn backend_for(
    app: &App,
    output: &Path,
    provider: Option<String>,
    model: Option<String>,
) -> Result<Box<dyn ImageBackend>> {
    let image = app.global_settings()?.models.image;
    let provider = provider.unwrap_or(image.provider);
    let model = model.unwrap_or(image.model);
    let scratch = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    tracing::debug!("Using image provider '{}' model '{}'", provider, model);
    image_backend(&provider, &model, scratch)
        .with_context(|| format!("Cannot use image provider '{}'", provider))
}

fn write_output(generated: &GenerationResult, output: &Path) -> Result<()> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    if fs::rename(&generated.local_path, output).is_err() {
        fs::copy(&generated.local_path, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        if let Err(e) = fs::remove_file(&generated.local_path) {
            tracing::warn!("Could not remove {}: {}", generated.local_path.display(), e);
        }
    }
    println!("Generated: {}", output.display());
    Ok(())
}
