//! Backend construction keyed on provider name.

use std::path::Path;

use crate::config::ModelSettings;

use super::mock::{MockAudioBackend, MockImageBackend, MockVideoBackend};
use super::poll::PollConfig;
use super::types::{ProviderError, ProviderResult};
use super::{AudioBackend, ImageBackend, VideoBackend};

/// Image backend for `provider`.
pub fn image_backend(
    provider: &str,
    model: &str,
    scratch_dir: &Path,
) -> ProviderResult<Box<dyn ImageBackend>> {
    match provider {
        "mock" => Ok(Box::new(MockImageBackend::new(model, scratch_dir))),
        other => Err(ProviderError::UnknownProvider {
            kind: "image",
            name: other.to_string(),
        }),
    }
}

/// Video backend for `provider`.
pub fn video_backend(
    provider: &str,
    model: &str,
    scratch_dir: &Path,
    poll: PollConfig,
) -> ProviderResult<Box<dyn VideoBackend>> {
    match provider {
        "mock" => Ok(Box::new(MockVideoBackend::new(model, scratch_dir, poll))),
        other => Err(ProviderError::UnknownProvider {
            kind: "video",
            name: other.to_string(),
        }),
    }
}

/// Audio backend for `provider`.
pub fn audio_backend(
    provider: &str,
    model: &str,
    scratch_dir: &Path,
) -> ProviderResult<Box<dyn AudioBackend>> {
    match provider {
        "mock" => Ok(Box::new(MockAudioBackend::new(model, scratch_dir))),
        other => Err(ProviderError::UnknownProvider {
            kind: "audio",
            name: other.to_string(),
        }),
    }
}

/// All three backends selected by the `models` config section.
pub struct Backends {
    pub image: Box<dyn ImageBackend>,
    pub video: Box<dyn VideoBackend>,
    pub audio: Box<dyn AudioBackend>,
}

impl Backends {
    pub fn from_settings(models: &ModelSettings, scratch_dir: &Path) -> ProviderResult<Self> {
        let poll = PollConfig::from_secs(
            models.video.poll_timeout_secs,
            models.video.poll_interval_secs,
        );
        Ok(Self {
            image: image_backend(&models.image.provider, &models.image.model, scratch_dir)?,
            video: video_backend(&models.video.provider, &models.video.model, scratch_dir, poll)?,
            audio: audio_backend(&models.audio.provider, &models.audio.model, scratch_dir)?,
        })
    }
}
