//! Per-project state store.
//!
//! The state document at `<project>/.videoclaw/state.json` is the single
//! source of truth for pipeline progress: overall status, one record per
//! step and one selection record per step that produced variants.
//!
//! Every mutation rewrites the whole document (write-through, no batching).
//! Concurrent writers from separate processes are not coordinated; the last
//! writer wins.
//!
//! # Example
//!
//! ```no_run
//! use videoclaw_core::state::{StateStore, StepName, StepStatus};
//!
//! let mut store = StateStore::load("/path/to/project").unwrap();
//! store.update_step(StepName::Analyze, StepStatus::InProgress, None).unwrap();
//! assert_eq!(store.get_step(StepName::Analyze).unwrap().status, StepStatus::InProgress);
//! ```

mod store;
mod types;

pub use store::{StateError, StateResult, StateStore, STATE_DIR, STATE_FILE};
pub use types::{SelectionRecord, StateDocument, StepName, StepRecord, StepStatus};
