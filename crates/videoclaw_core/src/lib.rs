//! videoclaw core - backend logic for the videoclaw CLI.
//!
//! This crate holds everything the pipeline needs with zero terminal
//! dependencies: the per-project state store, the step contract and
//! orchestrator, variant tracking, configuration, logging and the
//! provider/storage/media collaborator interfaces.

pub mod config;
pub mod logging;
pub mod media;
pub mod orchestrator;
pub mod project;
pub mod providers;
pub mod state;
pub mod storage;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
