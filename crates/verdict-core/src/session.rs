//! Review session: the query facade over one batch of improvements.
//!
//! A [`ReviewSession`] owns the normalized suggestion list, the snapshots it
//! was built from, and the resolution store. Everything except the store is
//! recomputed from inputs; [`ReviewSession::refresh`] swaps inputs without
//! losing decisions.

use serde::Serialize;

use crate::error::SuggestionError;
use crate::model::entity::Snapshots;
use crate::model::improvement::Improvements;
use crate::model::managed::ManagedInitiativeModel;
use crate::resolve::accepted::accepted_changes;
use crate::resolve::store::{Resolution, ResolutionStore};
use crate::suggest::normalize::normalize;
use crate::suggest::path::SuggestionPath;
use crate::suggest::suggestion::{Suggestion, SuggestionValue};
use crate::suggest::tree::{InitiativeNode, build_tree};

/// Resolution counts over a set of suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionProgress {
    pub total: usize,
    pub resolved: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl ResolutionProgress {
    #[must_use]
    pub const fn unresolved(&self) -> usize {
        self.total - self.resolved
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.resolved == self.total
    }
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
    snapshots: Snapshots,
    suggestions: Vec<Suggestion>,
    store: ResolutionStore,
}

impl ReviewSession {
    /// Normalize `improvements` against `snapshots` with an empty store.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures, see
    /// [`normalize`](crate::suggest::normalize::normalize).
    pub fn new(improvements: &Improvements, snapshots: Snapshots) -> Result<Self, SuggestionError> {
        let suggestions = normalize(improvements, &snapshots)?;
        Ok(Self {
            snapshots,
            suggestions,
            store: ResolutionStore::new(),
        })
    }

    /// Recompute suggestions from new inputs, keeping every resolution.
    ///
    /// Resolutions for paths that no longer exist stay in the store but
    /// have no visible effect. On error the session is left unchanged.
    ///
    /// # Errors
    ///
    /// Propagates normalization failures.
    pub fn refresh(
        &mut self,
        improvements: &Improvements,
        snapshots: Snapshots,
    ) -> Result<(), SuggestionError> {
        self.suggestions = normalize(improvements, &snapshots)?;
        self.snapshots = snapshots;
        Ok(())
    }

    #[must_use]
    pub const fn snapshots(&self) -> &Snapshots {
        &self.snapshots
    }

    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn entity_suggestions(&self) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(|s| s.is_entity())
    }

    pub fn field_suggestions(&self) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(|s| s.is_field())
    }

    #[must_use]
    pub fn suggestion(&self, path: &SuggestionPath) -> Option<&Suggestion> {
        self.suggestions.iter().find(|s| &s.path == path)
    }

    #[must_use]
    pub fn tree(&self) -> Vec<InitiativeNode<'_>> {
        build_tree(&self.suggestions)
    }

    #[must_use]
    pub const fn resolutions(&self) -> &ResolutionStore {
        &self.store
    }

    /// Every current suggestion is resolved.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.is_fully_resolved(None)
    }

    /// # Errors
    ///
    /// Returns [`SuggestionError::ValueMismatch`] for an override of the
    /// wrong shape.
    pub fn resolve(
        &mut self,
        path: &SuggestionPath,
        accept: bool,
        custom: Option<SuggestionValue>,
    ) -> Result<&Resolution, SuggestionError> {
        self.store.resolve(&self.suggestions, path, accept, custom)
    }

    /// [`resolve`](Self::resolve) with a dotted path.
    ///
    /// # Errors
    ///
    /// Also returns [`SuggestionError::InvalidPath`] when `path` does not
    /// parse.
    pub fn resolve_str(
        &mut self,
        path: &str,
        accept: bool,
        custom: Option<SuggestionValue>,
    ) -> Result<&Resolution, SuggestionError> {
        let path: SuggestionPath = path.parse()?;
        self.resolve(&path, accept, custom)
    }

    pub fn rollback(&mut self, path: &SuggestionPath) -> bool {
        self.store.rollback(path)
    }

    /// # Errors
    ///
    /// Returns [`SuggestionError::InvalidPath`] when `path` does not parse.
    pub fn rollback_str(&mut self, path: &str) -> Result<bool, SuggestionError> {
        let path: SuggestionPath = path.parse()?;
        Ok(self.rollback(&path))
    }

    pub fn accept_all(&mut self) {
        self.store.accept_all(&self.suggestions);
    }

    pub fn reject_all(&mut self) {
        self.store.reject_all(&self.suggestions);
    }

    pub fn rollback_all(&mut self) {
        self.store.rollback_all();
    }

    #[must_use]
    pub fn resolution_state(&self, path: &SuggestionPath) -> &Resolution {
        self.store.state(path)
    }

    #[must_use]
    pub fn is_fully_resolved(&self, prefix: Option<&SuggestionPath>) -> bool {
        self.store.is_fully_resolved(&self.suggestions, prefix)
    }

    /// # Errors
    ///
    /// Returns [`SuggestionError::InvalidPath`] when `prefix` does not parse.
    pub fn is_fully_resolved_str(&self, prefix: Option<&str>) -> Result<bool, SuggestionError> {
        let prefix = prefix.map(str::parse::<SuggestionPath>).transpose()?;
        Ok(self.is_fully_resolved(prefix.as_ref()))
    }

    #[must_use]
    pub fn is_resolved(&self, path: &SuggestionPath) -> bool {
        self.store.state(path).is_resolved
    }

    #[must_use]
    pub fn is_accepted(&self, path: &SuggestionPath) -> bool {
        self.store.state(path).is_accepted
    }

    #[must_use]
    pub fn is_rejected(&self, path: &SuggestionPath) -> bool {
        self.store.state(path).is_rejected()
    }

    /// Counts over the suggestions within `prefix`, or all of them.
    #[must_use]
    pub fn progress(&self, prefix: Option<&SuggestionPath>) -> ResolutionProgress {
        self.suggestions
            .iter()
            .filter(|s| prefix.is_none_or(|p| s.path.is_within(p)))
            .fold(ResolutionProgress::default(), |mut acc, s| {
                let state = self.store.state(&s.path);
                acc.total += 1;
                if state.is_resolved {
                    acc.resolved += 1;
                    if state.is_accepted {
                        acc.accepted += 1;
                    } else {
                        acc.rejected += 1;
                    }
                }
                acc
            })
    }

    #[must_use]
    pub fn accepted_changes(&self) -> Vec<ManagedInitiativeModel> {
        accepted_changes(&self.suggestions, &self.store)
    }
}
