//! Promoting a different variant to chosen after the fact.

use serde_json::Value;

use crate::state::{StateStore, StepName, StepStatus};

use super::errors::{StepError, StepResult};

/// Make `artifact` the chosen variant of the item that owns it.
///
/// Searches the completed output of `step` for a `{chosen, variants}`
/// entry listing `artifact`, rewrites its `chosen`, and records the
/// selection. The selection keeps its accumulated alternatives when it
/// already exists; otherwise the item's variants become the alternatives.
///
/// Returns the item's variants.
pub fn select_artifact(
    state: &mut StateStore,
    step: StepName,
    artifact: &str,
) -> StepResult<Vec<String>> {
    let record = state
        .get_step(step)
        .filter(|r| r.status == StepStatus::Completed)
        .ok_or_else(|| StepError::invalid_input(format!("step '{}' is not completed", step)))?;
    let mut output = record
        .output
        .clone()
        .ok_or_else(|| StepError::invalid_input(format!("step '{}' has no output", step)))?;

    let variants = promote_in(&mut output, artifact).ok_or_else(|| {
        StepError::invalid_input(format!(
            "'{}' is not a variant recorded by step '{}'",
            artifact, step
        ))
    })?;

    let alternatives = state
        .get_selection(step)
        .map(|s| s.alternatives.clone())
        .unwrap_or_else(|| variants.clone());

    state.update_step(step, StepStatus::Completed, Some(output))?;
    state.update_selection(step, artifact, alternatives)?;
    Ok(variants)
}

/// Depth-first search for the variant entry holding `artifact`.
fn promote_in(value: &mut Value, artifact: &str) -> Option<Vec<String>> {
    match value {
        Value::Object(map) => {
            let variants: Option<Vec<String>> = match (map.get("chosen"), map.get("variants")) {
                (Some(Value::String(_)), Some(Value::Array(items))) => Some(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                ),
                _ => None,
            };
            if let Some(variants) = variants {
                if variants.iter().any(|v| v == artifact) {
                    map.insert("chosen".to_string(), Value::String(artifact.to_string()));
                    return Some(variants);
                }
            }
            map.values_mut().find_map(|v| promote_in(v, artifact))
        }
        Value::Array(items) => items.iter_mut().find_map(|v| promote_in(v, artifact)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn promotes_variant_and_records_selection() {
        let dir = tempdir().unwrap();
        let mut state = StateStore::load(dir.path()).unwrap();
        state
            .update_step(
                StepName::Assets,
                StepStatus::Completed,
                Some(json!({
                    "characters": {
                        "hero": {"chosen": "hero_1.png", "variants": ["hero_1.png", "hero_2.png"]},
                        "sidekick": "sidekick.png"
                    },
                    "scenes": {}
                })),
            )
            .unwrap();

        let variants = select_artifact(&mut state, StepName::Assets, "hero_2.png").unwrap();
        assert_eq!(variants, vec!["hero_1.png", "hero_2.png"]);

        let output = state.get_step(StepName::Assets).unwrap().output.clone().unwrap();
        assert_eq!(output["characters"]["hero"]["chosen"], "hero_2.png");
        assert_eq!(output["characters"]["sidekick"], "sidekick.png");

        let selection = state.get_selection(StepName::Assets).unwrap();
        assert_eq!(selection.chosen, "hero_2.png");
        assert_eq!(selection.alternatives, variants);
    }

    #[test]
    fn finds_variants_inside_frame_lists() {
        let dir = tempdir().unwrap();
        let mut state = StateStore::load(dir.path()).unwrap();
        state
            .update_step(
                StepName::Storyboard,
                StepStatus::Completed,
                Some(json!({"frames": [
                    {"frame_id": 1, "path": "f1.png", "description": "a"},
                    {"frame_id": 2, "chosen": "f2_1.png", "variants": ["f2_1.png", "f2_2.png"], "description": "b"}
                ]})),
            )
            .unwrap();
        state
            .update_selection(StepName::Storyboard, "f2_1.png", vec!["x.png".to_string(), "f2_1.png".to_string()])
            .unwrap();

        select_artifact(&mut state, StepName::Storyboard, "f2_2.png").unwrap();

        let output = state.get_step(StepName::Storyboard).unwrap().output.clone().unwrap();
        assert_eq!(output["frames"][1]["chosen"], "f2_2.png");
        // Accumulated alternatives survive.
        assert_eq!(
            state.get_selection(StepName::Storyboard).unwrap().alternatives.len(),
            2
        );
    }

    #[test]
    fn unknown_artifact_or_step_is_rejected() {
        let dir = tempdir().unwrap();
        let mut state = StateStore::load(dir.path()).unwrap();
        assert!(select_artifact(&mut state, StepName::Assets, "a.png").is_err());

        state
            .update_step(StepName::Assets, StepStatus::Completed, Some(json!({"characters": {"a": "a.png"}})))
            .unwrap();
        let before = state.document().clone();
        assert!(select_artifact(&mut state, StepName::Assets, "a.png").is_err());
        assert_eq!(state.document(), &before);
    }
}
