//! Pipeline step implementations.
//!
//! Each step handles one phase of the video pipeline.

mod analyze;
mod assets;
mod audio;
mod common;
mod i2v;
mod merge;
mod storyboard;

pub use analyze::{parse_script, AnalyzeStep};
pub use assets::AssetsStep;
pub use audio::AudioStep;
pub use i2v::I2vStep;
pub use merge::MergeStep;
pub use storyboard::StoryboardStep;
