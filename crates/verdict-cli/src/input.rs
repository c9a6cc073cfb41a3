//! Bundle and decisions files.
//!
//! A bundle carries one batch of improvements plus the current snapshots it
//! is reviewed against. A decisions file replays a reviewer's choices onto a
//! session: bulk action first, then individual decisions, then rollbacks.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

use verdict_core::model::entity::{Initiative, Snapshots, Task};
use verdict_core::model::improvement::{
    ImprovementMap, Improvements, InitiativeImprovement, TaskImprovement,
};
use verdict_core::suggest::{SuggestionPath, SuggestionValue};
use verdict_core::{ReviewSession, SuggestionError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Bundle {
    pub initiative_improvements: ImprovementMap<InitiativeImprovement>,
    pub task_improvements: ImprovementMap<TaskImprovement>,
    pub initiatives: Vec<Initiative>,
    pub tasks: Vec<Task>,
}

impl Bundle {
    /// Normalize the bundle into a fresh review session.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures.
    pub fn into_session(self) -> Result<ReviewSession, SuggestionError> {
        let improvements = Improvements {
            initiative_improvements: self.initiative_improvements,
            task_improvements: self.task_improvements,
        };
        ReviewSession::new(&improvements, Snapshots::new(self.initiatives, self.tasks))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bulk {
    AcceptAll,
    RejectAll,
}

#[derive(Debug, Deserialize)]
pub struct Decision {
    pub path: SuggestionPath,
    pub accept: bool,
    /// Override value; a string for fields, an action object for entities.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Decisions {
    pub bulk: Option<Bulk>,
    pub decisions: Vec<Decision>,
    pub rollback: Vec<SuggestionPath>,
}

/// Read and parse a bundle file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a valid bundle.
pub fn load_bundle(path: &Path) -> Result<Bundle> {
    read_json(path)
}

/// Read and parse a decisions file.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a valid decisions document.
pub fn load_decisions(path: &Path) -> Result<Decisions> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Replay `decisions` onto `session`.
///
/// # Errors
///
/// Stops at the first override whose shape does not fit its path.
pub fn apply_decisions(
    session: &mut ReviewSession,
    decisions: Decisions,
) -> Result<(), SuggestionError> {
    match decisions.bulk {
        Some(Bulk::AcceptAll) => session.accept_all(),
        Some(Bulk::RejectAll) => session.reject_all(),
        None => {}
    }

    for decision in decisions.decisions {
        let custom = decision
            .value
            .map(|value| SuggestionValue::from_json_for(&decision.path, value))
            .transpose()?;
        session.resolve(&decision.path, decision.accept, custom)?;
    }

    for path in &decisions.rollback {
        session.rollback(path);
    }

    debug!(
        resolved = session.resolutions().len(),
        "applied decisions"
    );
    Ok(())
}
