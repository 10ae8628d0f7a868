//! Multi-candidate generation and the chosen/variants record shape.
//!
//! With one requested candidate an item's output is a bare path. With more
//! it is `{chosen, variants}` even if only one candidate succeeded; readers
//! accept both shapes through [`Candidates`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logging::ProjectLogger;

use super::confirm::{Confirmer, Decision};
use super::errors::{StepError, StepResult};

/// Generated candidates for one logical item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidates {
    /// Exactly one candidate was requested.
    Single(String),
    /// Several candidates; `chosen` is one of `variants`.
    Variants { chosen: String, variants: Vec<String> },
}

impl Candidates {
    /// Shape for `generated` (in generation order) given the requested count.
    ///
    /// The first entry becomes `chosen`. `None` if nothing was generated.
    pub fn from_generated(requested: usize, generated: Vec<String>) -> Option<Self> {
        let first = generated.first()?.clone();
        if requested > 1 {
            Some(Self::Variants {
                chosen: first,
                variants: generated,
            })
        } else {
            Some(Self::Single(first))
        }
    }

    /// The artifact downstream steps use.
    pub fn chosen(&self) -> &str {
        match self {
            Self::Single(path) => path,
            Self::Variants { chosen, .. } => chosen,
        }
    }

    /// Every candidate, chosen first for `Single`.
    pub fn all(&self) -> Vec<String> {
        match self {
            Self::Single(path) => vec![path.clone()],
            Self::Variants { variants, .. } => variants.clone(),
        }
    }

    pub fn has_variants(&self) -> bool {
        matches!(self, Self::Variants { .. })
    }

    /// Make `artifact` the chosen variant. Returns false if it is not one.
    pub fn promote(&mut self, artifact: &str) -> bool {
        match self {
            Self::Variants { chosen, variants } if variants.iter().any(|v| v == artifact) => {
                *chosen = artifact.to_string();
                true
            }
            _ => false,
        }
    }
}

/// How one item ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// At least one candidate is kept.
    Finalized(Candidates),
    /// The operator rejected the item; its files are removed.
    Rejected,
    /// No candidate could be generated.
    Failed,
}

/// Generate up to `requested` candidates for one item, in order.
///
/// `generate` receives the 1-based variant index (`None` when only one
/// candidate is requested) and returns the stored artifact path. Failures
/// are logged and skipped. `on_first` runs as soon as the first candidate
/// exists so a crash mid-item still leaves a usable partial record; its
/// errors abort the item.
pub fn generate_candidates<G, F>(
    logger: &ProjectLogger,
    item: &str,
    requested: usize,
    mut generate: G,
    mut on_first: F,
) -> StepResult<Vec<String>>
where
    G: FnMut(Option<usize>) -> StepResult<String>,
    F: FnMut(&str) -> StepResult<()>,
{
    let requested = requested.max(1);
    let mut generated = Vec::with_capacity(requested);

    for i in 0..requested {
        let variant = (requested > 1).then_some(i + 1);
        match generate(variant) {
            Ok(path) => {
                if generated.is_empty() {
                    on_first(&path)?;
                }
                logger.debug(&format!("{} candidate {} -> {}", item, i + 1, path));
                generated.push(path);
            }
            Err(e) => {
                logger.warn(&format!("{} candidate {} failed: {}", item, i + 1, e));
            }
        }
    }

    Ok(generated)
}

/// Produce one item, either unattended or through an operator review loop.
///
/// Unattended, this is [`generate_candidates`] followed by
/// [`Candidates::from_generated`]. With a confirmer each round generates
/// `requested` candidates and shows them in order: accept keeps the shown
/// candidate as chosen, reject discards it and moves to the next one,
/// revise starts a new round with a new prompt. Rejecting every candidate
/// of a round rejects the item.
///
/// `record_partial` is called with the candidate that should stand for the
/// item in the in-progress record: the first one generated, and again
/// whenever the recorded one is rejected.
pub fn produce_item<G, F>(
    logger: &ProjectLogger,
    confirmer: Option<&dyn Confirmer>,
    item: &str,
    prompt: &str,
    requested: usize,
    mut generate: G,
    record_partial: F,
) -> StepResult<ItemOutcome>
where
    G: FnMut(&str, Option<usize>) -> StepResult<String>,
    F: FnMut(&str) -> StepResult<()>,
{
    let requested = requested.max(1);
    let Some(confirmer) = confirmer else {
        let generated =
            generate_candidates(logger, item, requested, |v| generate(prompt, v), record_partial)?;
        return Ok(match Candidates::from_generated(requested, generated) {
            Some(candidates) => ItemOutcome::Finalized(candidates),
            None => ItemOutcome::Failed,
        });
    };

    review_loop(logger, confirmer, item, prompt, requested, generate, record_partial)
}

/// Variant index for candidate `v` of review round `round`.
///
/// A single-candidate first round keeps the plain name; later rounds and
/// multi-candidate rounds are numbered without reusing earlier numbers.
fn round_variant(round: usize, requested: usize, v: Option<usize>) -> Option<usize> {
    match v {
        Some(i) => Some(round * requested + i),
        None if round == 0 => None,
        None => Some(round + 1),
    }
}

fn review_loop<G, F>(
    logger: &ProjectLogger,
    confirmer: &dyn Confirmer,
    item: &str,
    prompt: &str,
    requested: usize,
    mut generate: G,
    mut record_partial: F,
) -> StepResult<ItemOutcome>
where
    G: FnMut(&str, Option<usize>) -> StepResult<String>,
    F: FnMut(&str) -> StepResult<()>,
{
    let mut prompt = prompt.to_string();
    let mut kept: Vec<String> = Vec::new();
    let mut recorded: Option<String> = None;
    let mut round = 0;

    loop {
        let batch = generate_candidates(
            logger,
            item,
            requested,
            |v| generate(&prompt, round_variant(round, requested, v)),
            |_| Ok(()),
        )?;
        round += 1;

        let pending = if batch.is_empty() {
            // Keep reviewing what we have.
            match kept.last() {
                Some(last) => vec![last.clone()],
                None => return Ok(ItemOutcome::Failed),
            }
        } else {
            batch
        };
        for candidate in &pending {
            if !kept.contains(candidate) {
                kept.push(candidate.clone());
            }
        }

        let mut revised = false;
        for candidate in pending {
            if recorded.is_none() {
                record_partial(&candidate)?;
                recorded = Some(candidate.clone());
            }

            match confirmer
                .review(item, Path::new(&candidate))
                .map_err(|e| StepError::io_error("reading operator decision", e))?
            {
                Decision::Accept => {
                    logger.info(&format!("{} accepted: {}", item, candidate));
                    let outcome = if requested > 1 || kept.len() > 1 {
                        Candidates::Variants {
                            chosen: candidate,
                            variants: kept,
                        }
                    } else {
                        Candidates::Single(candidate)
                    };
                    return Ok(ItemOutcome::Finalized(outcome));
                }
                Decision::Reject => {
                    logger.info(&format!("{} rejected: {}", item, candidate));
                    discard(logger, &candidate);
                    kept.retain(|k| k != &candidate);
                    if recorded.as_deref() == Some(candidate.as_str()) {
                        recorded = None;
                    }
                }
                Decision::Revise(new_prompt) => {
                    if !new_prompt.trim().is_empty() {
                        prompt = new_prompt;
                    }
                    logger.info(&format!("{} revising with prompt: {}", item, prompt));
                    revised = true;
                    break;
                }
            }
        }

        if !revised {
            logger.info(&format!("{} rejected", item));
            for path in &kept {
                discard(logger, path);
            }
            return Ok(ItemOutcome::Rejected);
        }
    }
}

/// Remove a rejected candidate file. Failures are logged, not fatal.
fn discard(logger: &ProjectLogger, path: &str) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            logger.warn(&format!("Could not remove rejected candidate {}: {}", path, e));
        }
    }
}
