//! Structural check of a project's state document.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::state::{StateDocument, StateError};

use super::ProjectResult;

/// Fields the analyze output must carry in strict mode.
const STRICT_ANALYZE_FIELDS: [&str; 4] = ["script", "characters", "scenes", "frames"];

/// Outcome of [`validate_state`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the document invalid.
    pub errors: Vec<String>,
    /// Problems worth showing but not fatal.
    pub warnings: Vec<String>,
    /// First characters of the analyzed script.
    pub script_preview: Option<String>,
    pub characters: Option<usize>,
    pub scenes: Option<usize>,
    pub frames: Option<usize>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check `state_file`.
///
/// A file that is not JSON at all is an `Err`; everything else is reported.
/// Strict mode turns missing analyze fields from warnings into errors.
pub fn validate_state(state_file: &Path, strict: bool) -> ProjectResult<ValidationReport> {
    let content = fs::read_to_string(state_file).map_err(|source| StateError::Io {
        operation: "read",
        path: state_file.to_path_buf(),
        source,
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|source| StateError::Corrupt {
        path: state_file.to_path_buf(),
        source,
    })?;

    let mut report = ValidationReport::default();

    if data.get("steps").is_none() {
        report.errors.push("missing 'steps' field".to_string());
        return Ok(report);
    }
    if let Err(e) = serde_json::from_value::<StateDocument>(data.clone()) {
        report.errors.push(format!("unexpected document shape: {}", e));
    }

    let analyze = data
        .pointer("/steps/analyze/output")
        .and_then(Value::as_object);
    let Some(analyze) = analyze.filter(|o| !o.is_empty()) else {
        report
            .warnings
            .push("analyze step has not completed or has no output".to_string());
        if strict {
            report
                .errors
                .push("strict mode requires analyze output".to_string());
        }
        return Ok(report);
    };

    for field in STRICT_ANALYZE_FIELDS {
        if !analyze.contains_key(field) {
            let message = format!("analyze output is missing '{}'", field);
            if strict {
                report.errors.push(message);
            } else if field == "script" {
                report.warnings.push(message);
            }
        }
    }

    report.script_preview = analyze
        .get("script")
        .and_then(Value::as_str)
        .map(|s| s.chars().take(50).collect());
    let count = |key: &str| analyze.get(key).and_then(Value::as_array).map(Vec::len);
    report.characters = count("characters");
    report.scenes = count("scenes");
    report.frames = count("frames");

    Ok(report)
}
