//! Offline mock backends.
//!
//! They never touch the network: images are small solid-colour PNGs whose
//! colour is derived from the prompt, video and audio are placeholder bytes.
//! Output goes to a scratch directory, one new file per call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgb, RgbImage};

use super::poll::{poll_until_ready, JobPoll, PollConfig};
use super::types::{GenerationResult, ProviderError, ProviderResult, VideoOptions};
use super::{AudioBackend, ImageBackend, VideoBackend};

const PROVIDER: &str = "mock";

/// Width of mock images.
pub const MOCK_IMAGE_WIDTH: u32 = 160;
/// Height of mock images.
pub const MOCK_IMAGE_HEIGHT: u32 = 90;

/// Unique scratch path: kind, prompt digest, per-backend counter.
fn scratch_path(dir: &Path, kind: &str, seed: &str, counter: &AtomicUsize, ext: &str) -> PathBuf {
    let digest = format!("{:x}", md5::compute(seed.as_bytes()));
    let n = counter.fetch_add(1, Ordering::SeqCst);
    dir.join(format!("mock_{}_{}_{}.{}", kind, &digest[..8], n, ext))
}

fn ensure_dir(dir: &Path) -> ProviderResult<()> {
    fs::create_dir_all(dir).map_err(|e| ProviderError::io("creating mock output directory", e))
}

/// Mock text-to-image / image-to-image backend.
pub struct MockImageBackend {
    model: String,
    output_dir: PathBuf,
    counter: AtomicUsize,
}

impl MockImageBackend {
    pub fn new(model: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            output_dir: output_dir.into(),
            counter: AtomicUsize::new(0),
        }
    }

    fn render(&self, prompt: &str) -> ProviderResult<GenerationResult> {
        if prompt.trim().is_empty() {
            return Err(ProviderError::InvalidInput("empty prompt".to_string()));
        }
        ensure_dir(&self.output_dir)?;

        let digest = md5::compute(prompt.as_bytes());
        let color = Rgb([digest[0], digest[1], digest[2]]);
        let path = scratch_path(&self.output_dir, "image", prompt, &self.counter, "png");

        RgbImage::from_pixel(MOCK_IMAGE_WIDTH, MOCK_IMAGE_HEIGHT, color)
            .save(&path)
            .map_err(|e| ProviderError::generation(PROVIDER, e.to_string()))?;

        Ok(GenerationResult::new(path)
            .with_metadata("provider", PROVIDER)
            .with_metadata("model", self.model.clone())
            .with_metadata("width", MOCK_IMAGE_WIDTH)
            .with_metadata("height", MOCK_IMAGE_HEIGHT)
            .with_metadata("format", "png"))
    }
}

impl ImageBackend for MockImageBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn text_to_image(&self, prompt: &str) -> ProviderResult<GenerationResult> {
        self.render(prompt)
    }

    fn image_to_image(&self, reference: &Path, prompt: &str) -> ProviderResult<GenerationResult> {
        if !reference.exists() {
            return Err(ProviderError::InvalidInput(format!(
                "reference image {} does not exist",
                reference.display()
            )));
        }
        Ok(self
            .render(prompt)?
            .with_metadata("reference", reference.display().to_string()))
    }
}

/// Mock image-to-video backend simulating an asynchronous job.
pub struct MockVideoBackend {
    model: String,
    output_dir: PathBuf,
    counter: AtomicUsize,
    poll: PollConfig,
    /// Number of `Pending` answers before the job is ready.
    pending_polls: usize,
}

impl MockVideoBackend {
    pub fn new(model: impl Into<String>, output_dir: impl Into<PathBuf>, poll: PollConfig) -> Self {
        Self {
            model: model.into(),
            output_dir: output_dir.into(),
            counter: AtomicUsize::new(0),
            poll,
            pending_polls: 0,
        }
    }

    /// Make the simulated job report `Pending` this many times first.
    pub fn with_pending_polls(mut self, pending_polls: usize) -> Self {
        self.pending_polls = pending_polls;
        self
    }
}

impl VideoBackend for MockVideoBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn image_to_video(
        &self,
        image: &Path,
        prompt: &str,
        options: &VideoOptions,
    ) -> ProviderResult<GenerationResult> {
        if !image.exists() {
            return Err(ProviderError::InvalidInput(format!(
                "source image {} does not exist",
                image.display()
            )));
        }
        ensure_dir(&self.output_dir)?;
        let path = scratch_path(&self.output_dir, "video", prompt, &self.counter, "mp4");

        let mut remaining = self.pending_polls;
        poll_until_ready(PROVIDER, self.poll, || {
            if remaining > 0 {
                remaining -= 1;
                return Ok(JobPoll::Pending);
            }
            fs::write(&path, b"mock video")
                .map_err(|e| ProviderError::io("writing mock video", e))?;
            Ok(JobPoll::Ready(()))
        })?;

        Ok(GenerationResult::new(path)
            .with_metadata("provider", PROVIDER)
            .with_metadata("model", self.model.clone())
            .with_metadata("duration", options.duration_secs)
            .with_metadata("resolution", options.resolution.clone())
            .with_metadata("format", "mp4"))
    }
}

/// Mock speech and music backend.
pub struct MockAudioBackend {
    model: String,
    output_dir: PathBuf,
    counter: AtomicUsize,
}

impl MockAudioBackend {
    pub fn new(model: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            output_dir: output_dir.into(),
            counter: AtomicUsize::new(0),
        }
    }
}

impl AudioBackend for MockAudioBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn text_to_speech(&self, text: &str, voice: &str) -> ProviderResult<GenerationResult> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidInput("empty text".to_string()));
        }
        ensure_dir(&self.output_dir)?;
        let path = scratch_path(&self.output_dir, "audio", text, &self.counter, "mp3");
        fs::write(&path, b"mock audio").map_err(|e| ProviderError::io("writing mock audio", e))?;

        Ok(GenerationResult::new(path)
            .with_metadata("provider", PROVIDER)
            .with_metadata("model", self.model.clone())
            .with_metadata("duration", 3)
            .with_metadata("format", "mp3")
            .with_metadata("voice", voice))
    }

    fn generate_bgm(&self, style: &str, duration_secs: u32) -> ProviderResult<GenerationResult> {
        ensure_dir(&self.output_dir)?;
        let path = scratch_path(&self.output_dir, "bgm", style, &self.counter, "mp3");
        fs::write(&path, b"mock bgm").map_err(|e| ProviderError::io("writing mock bgm", e))?;

        Ok(GenerationResult::new(path)
            .with_metadata("provider", PROVIDER)
            .with_metadata("model", self.model.clone())
            .with_metadata("duration", duration_secs)
            .with_metadata("format", "mp3")
            .with_metadata("style", style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn images_are_real_pngs_and_unique_per_call() {
        let dir = tempdir().unwrap();
        let backend = MockImageBackend::new("m", dir.path());

        let a = backend.text_to_image("an astronaut on mars").unwrap();
        let b = backend.text_to_image("an astronaut on mars").unwrap();

        assert_ne!(a.local_path, b.local_path);
        let img = image::open(&a.local_path).unwrap();
        assert_eq!(img.width(), MOCK_IMAGE_WIDTH);
        assert_eq!(a.metadata["provider"], "mock");
    }

    #[test]
    fn image_to_image_requires_reference() {
        let dir = tempdir().unwrap();
        let backend = MockImageBackend::new("m", dir.path());

        let err = backend
            .image_to_image(&dir.path().join("missing.png"), "prompt")
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidInput(_)));

        let reference = backend.text_to_image("ref").unwrap();
        let out = backend.image_to_image(&reference.local_path, "prompt").unwrap();
        assert!(out.local_path.exists());
        assert!(out.metadata.contains_key("reference"));
    }

    #[test]
    fn video_job_is_polled_until_ready() {
        let dir = tempdir().unwrap();
        let image = MockImageBackend::new("m", dir.path()).text_to_image("frame").unwrap();
        let poll = PollConfig {
            timeout: Duration::from_secs(1),
            interval: Duration::from_millis(1),
        };
        let backend = MockVideoBackend::new("m", dir.path(), poll).with_pending_polls(2);

        let clip = backend
            .image_to_video(&image.local_path, "pan left", &VideoOptions::default())
            .unwrap();
        assert_eq!(fs::read(&clip.local_path).unwrap(), b"mock video");
    }

    #[test]
    fn audio_writes_placeholders() {
        let dir = tempdir().unwrap();
        let backend = MockAudioBackend::new("m", dir.path());

        let speech = backend.text_to_speech("hello", "narrator").unwrap();
        assert_eq!(speech.metadata["voice"], "narrator");
        let bgm = backend.generate_bgm("ambient", 30).unwrap();
        assert_eq!(bgm.metadata["duration"], 30);
        assert!(backend.text_to_speech("  ", "narrator").is_err());
    }
}
