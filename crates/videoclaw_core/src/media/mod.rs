//! Final video assembly.
//!
//! The merge step depends only on [`MediaMerger`]; [`FfmpegMerger`] is the
//! implementation that shells out to `ffmpeg`.

mod ffmpeg;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logging::ProjectLogger;

pub use ffmpeg::FfmpegMerger;

/// Errors from media tools.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The tool ran and exited non-zero.
    #[error("{tool} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        stderr: String,
    },

    /// Nothing to merge.
    #[error("No input clips given")]
    NoInputs,

    /// An input file is missing.
    #[error("Input file not found: {0}")]
    InputMissing(PathBuf),

    /// File I/O or process spawn error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Concatenation and audio muxing.
pub trait MediaMerger: Send + Sync {
    /// Join `clips` in order into `output`.
    fn concat(&self, clips: &[PathBuf], output: &Path, logger: &ProjectLogger) -> MediaResult<()>;

    /// Lay `audio` over `video`, writing `output`.
    fn add_audio(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        logger: &ProjectLogger,
    ) -> MediaResult<()>;
}
