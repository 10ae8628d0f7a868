//! Recorded output of each step.
//!
//! These are the payloads stored in the state document; later steps read
//! their predecessors' records through them, so field names and shapes are
//! part of the on-disk format.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::variants::Candidates;

/// A character found in the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// A location found in the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub time: String,
}

/// A notable object found in the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub name: String,
    pub description: String,
}

/// One storyboard frame planned by analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePlan {
    pub frame_id: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
}

/// Output of `analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub script: String,
    pub characters: Vec<Character>,
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub props: Vec<Prop>,
    pub frames: Vec<FramePlan>,
}

/// Output of `assets`: one entry per character and scene name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsOutput {
    #[serde(default)]
    pub characters: BTreeMap<String, Candidates>,
    #[serde(default)]
    pub scenes: BTreeMap<String, Candidates>,
}

/// Image of a storyboard frame, flattened into the frame record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameImage {
    Variants { chosen: String, variants: Vec<String> },
    Single { path: String },
}

impl FrameImage {
    pub fn chosen(&self) -> &str {
        match self {
            Self::Variants { chosen, .. } => chosen,
            Self::Single { path } => path,
        }
    }
}

impl From<Candidates> for FrameImage {
    fn from(candidates: Candidates) -> Self {
        match candidates {
            Candidates::Single(path) => Self::Single { path },
            Candidates::Variants { chosen, variants } => Self::Variants { chosen, variants },
        }
    }
}

/// One rendered storyboard frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardFrame {
    pub frame_id: u32,
    #[serde(flatten)]
    pub image: FrameImage,
    pub description: String,
}

/// Output of `storyboard`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardOutput {
    pub frames: Vec<StoryboardFrame>,
}

/// One generated clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoClip {
    /// Animated storyboard frame.
    Frame {
        frame_id: u32,
        path: String,
        description: String,
    },
    /// Clip from an explicitly given image.
    Standalone {
        index: usize,
        path: String,
        prompt: String,
    },
}

impl VideoClip {
    pub fn path(&self) -> &str {
        match self {
            Self::Frame { path, .. } | Self::Standalone { path, .. } => path,
        }
    }

    /// Text the clip was generated from.
    pub fn text(&self) -> &str {
        match self {
            Self::Frame { description, .. } => description,
            Self::Standalone { prompt, .. } => prompt,
        }
    }
}

/// Output of `i2v`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct I2vOutput {
    pub videos: Vec<VideoClip>,
}

/// One spoken line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialogue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub path: String,
    pub text: String,
}

/// Output of `audio`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOutput {
    pub dialogues: Vec<Dialogue>,
    #[serde(default)]
    pub sfx: Vec<String>,
    pub bgm: Option<String>,
}

/// Output of `merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOutput {
    pub output_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn storyboard_frame_flattens_both_image_shapes() {
        let single = StoryboardFrame {
            frame_id: 1,
            image: FrameImage::Single {
                path: "frame_001.png".to_string(),
            },
            description: "hero walks".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            json!({"frame_id": 1, "path": "frame_001.png", "description": "hero walks"})
        );

        let parsed: StoryboardFrame = serde_json::from_value(json!({
            "frame_id": 2,
            "chosen": "frame_002_2.png",
            "variants": ["frame_002_1.png", "frame_002_2.png"],
            "description": "hero looks"
        }))
        .unwrap();
        assert_eq!(parsed.image.chosen(), "frame_002_2.png");
    }

    #[test]
    fn clips_keep_their_shape() {
        let clips: Vec<VideoClip> = serde_json::from_value(json!([
            {"frame_id": 1, "path": "v0.mp4", "description": "walks"},
            {"index": 0, "path": "v1.mp4", "prompt": "pan"}
        ]))
        .unwrap();
        assert!(matches!(clips[0], VideoClip::Frame { .. }));
        assert_eq!(clips[1].text(), "pan");
    }

    #[test]
    fn audio_bgm_serializes_as_null() {
        let value = serde_json::to_value(AudioOutput::default()).unwrap();
        assert_eq!(value, json!({"dialogues": [], "sfx": [], "bgm": null}));
    }
}
