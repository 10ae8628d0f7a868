//! State document types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pipeline step.
///
/// Variants are declared in pipeline order, so the derived `Ord` sorts
/// steps the way they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepName {
    Analyze,
    Assets,
    Storyboard,
    I2v,
    Audio,
    Merge,
}

impl StepName {
    /// All steps in pipeline order.
    pub const ALL: [StepName; 6] = [
        StepName::Analyze,
        StepName::Assets,
        StepName::Storyboard,
        StepName::I2v,
        StepName::Audio,
        StepName::Merge,
    ];

    /// Wire name used in the state document and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Assets => "assets",
            Self::Storyboard => "storyboard",
            Self::I2v => "i2v",
            Self::Audio => "audio",
            Self::Merge => "merge",
        }
    }

    /// Steps that must be `completed` before this one may start.
    ///
    /// `i2v` declares `storyboard` here; its standalone mode overrides this
    /// at the step level.
    pub fn predecessors(&self) -> &'static [StepName] {
        match self {
            Self::Analyze => &[],
            Self::Assets => &[StepName::Analyze],
            Self::Storyboard => &[StepName::Assets, StepName::Analyze],
            Self::I2v => &[StepName::Storyboard],
            Self::Audio => &[StepName::I2v],
            Self::Merge => &[StepName::Audio],
        }
    }

    /// Overall project status while this step runs.
    pub fn running_label(&self) -> &'static str {
        match self {
            Self::Analyze => "analyzing",
            Self::Assets => "generating_assets",
            Self::Storyboard => "rendering_storyboard",
            Self::I2v => "generating_video",
            Self::Audio => "generating_audio",
            Self::Merge => "merging_video",
        }
    }

    /// Overall project status once this step completed.
    pub fn completed_label(&self) -> &'static str {
        match self {
            Self::Analyze => "analyzed",
            Self::Assets => "assets_generated",
            Self::Storyboard => "storyboard_rendered",
            Self::I2v => "video_generated",
            Self::Audio => "audio_generated",
            Self::Merge => "completed",
        }
    }

    /// Overall project status after this step failed.
    pub fn failed_label(&self) -> String {
        format!("{}_failed", self.as_str())
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepName::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown step '{}'", s))
    }
}

/// Status of a recorded step. A step with no record has not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline step for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub status: StepStatus,
    pub updated_at: String,
    /// Step-specific payload. `None` means no output was given; an empty
    /// object is kept as an empty object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// Operator choice among the candidates a step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRecord {
    pub chosen: String,
    pub alternatives: Vec<String>,
    pub updated_at: String,
}

/// The persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub project_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub steps: BTreeMap<StepName, StepRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selections: BTreeMap<StepName, SelectionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl StateDocument {
    /// Fresh document for a project that has no state yet.
    pub fn initial(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            status: Some("initialized".to_string()),
            steps: BTreeMap::new(),
            selections: BTreeMap::new(),
            created_at: Some(now()),
            updated_at: None,
        }
    }
}

/// Timestamp format used throughout the state document.
pub(crate) fn now() -> String {
    chrono::Local::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_names_sort_in_pipeline_order() {
        let mut shuffled = vec![
            StepName::Merge,
            StepName::Analyze,
            StepName::I2v,
            StepName::Assets,
            StepName::Audio,
            StepName::Storyboard,
        ];
        shuffled.sort();
        assert_eq!(shuffled, StepName::ALL.to_vec());
    }

    #[test]
    fn step_name_parses_wire_names() {
        for step in StepName::ALL {
            assert_eq!(step.as_str().parse::<StepName>().unwrap(), step);
        }
        assert!("render".parse::<StepName>().is_err());
    }

    #[test]
    fn predecessor_graph_matches_pipeline() {
        assert!(StepName::Analyze.predecessors().is_empty());
        assert_eq!(StepName::Assets.predecessors(), &[StepName::Analyze]);
        assert_eq!(
            StepName::Storyboard.predecessors(),
            &[StepName::Assets, StepName::Analyze]
        );
        assert_eq!(StepName::Merge.predecessors(), &[StepName::Audio]);
    }

    #[test]
    fn document_serializes_with_wire_names() {
        let mut doc = StateDocument::initial("demo");
        doc.steps.insert(
            StepName::I2v,
            StepRecord {
                status: StepStatus::InProgress,
                updated_at: now(),
                output: None,
            },
        );
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["status"], "initialized");
        assert_eq!(json["steps"]["i2v"]["status"], "in_progress");
        assert!(json["steps"]["i2v"].get("output").is_none());
        assert!(json.get("selections").is_none());
    }
}
