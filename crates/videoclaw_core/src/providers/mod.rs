//! Generation backends.
//!
//! One small capability trait per media kind. The orchestrator only sees
//! these traits; which implementation runs is decided by the factory from
//! the `models` config section.

mod factory;
mod mock;
mod poll;
mod types;

use std::path::Path;

pub use factory::{audio_backend, image_backend, video_backend, Backends};
pub use mock::{
    MockAudioBackend, MockImageBackend, MockVideoBackend, MOCK_IMAGE_HEIGHT, MOCK_IMAGE_WIDTH,
};
pub use poll::{poll_until_ready, JobPoll, PollConfig};
pub use types::{GenerationResult, ProviderError, ProviderResult, VideoOptions};

/// Text-to-image and image-to-image generation.
pub trait ImageBackend: Send + Sync {
    /// Provider name recorded in logs and metadata.
    fn name(&self) -> &str;

    fn text_to_image(&self, prompt: &str) -> ProviderResult<GenerationResult>;

    /// Generate from a reference image plus prompt.
    fn image_to_image(&self, reference: &Path, prompt: &str) -> ProviderResult<GenerationResult>;
}

/// Image-to-video generation.
pub trait VideoBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Animate `image` following `prompt`. May block while a remote job runs.
    fn image_to_video(
        &self,
        image: &Path,
        prompt: &str,
        options: &VideoOptions,
    ) -> ProviderResult<GenerationResult>;
}

/// Speech and background music generation.
pub trait AudioBackend: Send + Sync {
    fn name(&self) -> &str;

    fn text_to_speech(&self, text: &str, voice: &str) -> ProviderResult<GenerationResult>;

    fn generate_bgm(&self, style: &str, duration_secs: u32) -> ProviderResult<GenerationResult>;
}
