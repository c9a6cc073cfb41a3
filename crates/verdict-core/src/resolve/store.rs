//! Path-keyed resolution state.
//!
//! The store is the only mutable state of a review. A path with no entry is
//! unresolved. Writes are last-write-wins per path and never cascade: an
//! entity resolution says nothing about its fields, and vice versa.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use tracing::{trace, warn};

use crate::error::SuggestionError;
use crate::suggest::path::SuggestionPath;
use crate::suggest::suggestion::{EntityAction, Suggestion, SuggestionDetail, SuggestionValue};

/// The value a resolution records.
///
/// `Unset` is the default and renders as `null`. `Absent` marks a rejected
/// suggestion with nothing to fall back to and is omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolvedValue {
    #[default]
    Unset,
    Absent,
    Value(SuggestionValue),
}

impl ResolvedValue {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Value(value) => value.as_text(),
            Self::Unset | Self::Absent => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityAction> {
        match self {
            Self::Value(value) => value.as_entity(),
            Self::Unset | Self::Absent => None,
        }
    }
}

impl Serialize for ResolvedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset | Self::Absent => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
        }
    }
}

/// The human decision recorded against one path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub is_resolved: bool,
    pub is_accepted: bool,
    #[serde(skip_serializing_if = "ResolvedValue::is_absent")]
    pub resolved_value: ResolvedValue,
}

static UNRESOLVED: Resolution = Resolution::unresolved();

impl Resolution {
    /// `{ is_resolved: false, is_accepted: false, resolved_value: null }`.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self {
            is_resolved: false,
            is_accepted: false,
            resolved_value: ResolvedValue::Unset,
        }
    }

    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        self.is_resolved && !self.is_accepted
    }

    /// Resolution of `suggestion` with an optional override.
    ///
    /// Accepting stores the override, or the suggested value without one.
    /// Rejecting a field falls back to its original value; rejecting an
    /// entity, or a field with no original, stores `Absent`. The override is
    /// ignored on reject.
    fn decide(
        suggestion: &Suggestion,
        accept: bool,
        custom: Option<SuggestionValue>,
    ) -> Result<Self, SuggestionError> {
        let resolved_value = match (accept, custom) {
            (true, Some(custom)) => {
                suggestion.check_value(&custom)?;
                ResolvedValue::Value(custom)
            }
            (true, None) => ResolvedValue::Value(suggestion.suggested_value()),
            (false, _) => match &suggestion.detail {
                SuggestionDetail::Field(field) => field
                    .original_value
                    .clone()
                    .map_or(ResolvedValue::Absent, |text| {
                        ResolvedValue::Value(SuggestionValue::Text(text))
                    }),
                SuggestionDetail::Entity(_) => ResolvedValue::Absent,
            },
        };
        Ok(Self {
            is_resolved: true,
            is_accepted: accept,
            resolved_value,
        })
    }
}

/// Resolutions keyed by suggestion path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolutionStore {
    entries: BTreeMap<SuggestionPath, Resolution>,
}

impl ResolutionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision for `path`, replacing any earlier one.
    ///
    /// A path with no suggestion in `suggestions` is stored anyway: accept
    /// keeps the override (or `Unset`), reject stores `Absent`.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError::ValueMismatch`] when accepting with an
    /// override whose shape does not match the suggestion. The store is left
    /// unchanged in that case.
    pub fn resolve(
        &mut self,
        suggestions: &[Suggestion],
        path: &SuggestionPath,
        accept: bool,
        custom: Option<SuggestionValue>,
    ) -> Result<&Resolution, SuggestionError> {
        let resolution = match suggestions.iter().find(|s| &s.path == path) {
            Some(suggestion) => Resolution::decide(suggestion, accept, custom)?,
            None => {
                warn!(path = %path, "resolving a path with no current suggestion");
                Resolution {
                    is_resolved: true,
                    is_accepted: accept,
                    resolved_value: match custom {
                        Some(value) if accept => ResolvedValue::Value(value),
                        _ if accept => ResolvedValue::Unset,
                        _ => ResolvedValue::Absent,
                    },
                }
            }
        };

        trace!(path = %path, accept, "resolved");
        self.entries.insert(path.clone(), resolution);
        Ok(self.state(path))
    }

    /// Forget the decision for `path`. Returns whether one existed.
    pub fn rollback(&mut self, path: &SuggestionPath) -> bool {
        let removed = self.entries.remove(path).is_some();
        trace!(path = %path, removed, "rolled back");
        removed
    }

    /// Accept every suggestion as suggested. Replaces the whole store.
    pub fn accept_all(&mut self, suggestions: &[Suggestion]) {
        self.replace_all(suggestions, true);
    }

    /// Reject every suggestion. Replaces the whole store.
    pub fn reject_all(&mut self, suggestions: &[Suggestion]) {
        self.replace_all(suggestions, false);
    }

    fn replace_all(&mut self, suggestions: &[Suggestion], accept: bool) {
        let mut entries = BTreeMap::new();
        for suggestion in suggestions {
            // Without an override `decide` cannot fail.
            if let Ok(resolution) = Resolution::decide(suggestion, accept, None) {
                entries.insert(suggestion.path.clone(), resolution);
            }
        }
        trace!(accept, count = entries.len(), "bulk resolved");
        self.entries = entries;
    }

    pub fn rollback_all(&mut self) {
        trace!(count = self.entries.len(), "cleared resolutions");
        self.entries.clear();
    }

    /// The stored resolution, or the unresolved default.
    #[must_use]
    pub fn state(&self, path: &SuggestionPath) -> &Resolution {
        self.entries.get(path).unwrap_or(&UNRESOLVED)
    }

    /// True when every suggestion within `prefix` (or every suggestion) is
    /// resolved. Vacuously true for an empty selection.
    #[must_use]
    pub fn is_fully_resolved(
        &self,
        suggestions: &[Suggestion],
        prefix: Option<&SuggestionPath>,
    ) -> bool {
        suggestions
            .iter()
            .filter(|s| prefix.is_none_or(|p| s.path.is_within(p)))
            .all(|s| self.state(&s.path).is_resolved)
    }

    #[must_use]
    pub const fn resolutions(&self) -> &BTreeMap<SuggestionPath, Resolution> {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
