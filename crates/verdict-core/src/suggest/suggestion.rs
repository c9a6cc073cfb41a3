//! Normalized, reviewable suggestions.
//!
//! A suggestion is either a whole entity action (CREATE/UPDATE/DELETE of an
//! initiative or task) or a single field of such an action. Each carries its
//! proposed value and, when available, the pre-change value it replaces.

use serde::{Serialize, Serializer};

use crate::error::SuggestionError;
use crate::model::entity::EntitySnapshot;
use crate::model::improvement::{Action, InitiativeImprovement, TaskImprovement};

use super::path::{FieldName, SuggestionPath};

// ---------------------------------------------------------------------------
// EntityAction
// ---------------------------------------------------------------------------

/// The action payload behind an entity suggestion.
///
/// Serializes as the inner improvement. There is no `Deserialize` impl: the
/// entity kind is decided by the path, see [`SuggestionValue::from_json_for`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityAction {
    Initiative(InitiativeImprovement),
    Task(TaskImprovement),
}

impl EntityAction {
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Initiative(i) => i.action(),
            Self::Task(t) => t.action(),
        }
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Initiative(_) => "initiative",
            Self::Task(_) => "task",
        }
    }
}

impl Serialize for EntityAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Initiative(i) => i.serialize(serializer),
            Self::Task(t) => t.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// SuggestionValue
// ---------------------------------------------------------------------------

/// A value a suggestion can resolve to: a field's text or an entity payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionValue {
    Text(String),
    Entity(EntityAction),
}

impl SuggestionValue {
    /// Interpret a JSON value as a resolution value for `path`.
    ///
    /// Field paths take a JSON string. Initiative paths take an initiative
    /// improvement object and task paths a task improvement object.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError::ValueMismatch`] when the JSON does not have
    /// the shape the path expects.
    pub fn from_json_for(
        path: &SuggestionPath,
        value: serde_json::Value,
    ) -> Result<Self, SuggestionError> {
        let mismatch = |expected| SuggestionError::ValueMismatch {
            path: path.to_string(),
            expected,
        };

        match path {
            SuggestionPath::InitiativeField { .. } | SuggestionPath::TaskField { .. } => {
                match value {
                    serde_json::Value::String(text) => Ok(Self::Text(text)),
                    _ => Err(mismatch("a string")),
                }
            }
            SuggestionPath::Initiative { .. } => serde_json::from_value(value)
                .map(|i| Self::Entity(EntityAction::Initiative(i)))
                .map_err(|_| mismatch("an initiative action")),
            SuggestionPath::Task { .. } => serde_json::from_value(value)
                .map(|t| Self::Entity(EntityAction::Task(t)))
                .map_err(|_| mismatch("a task action")),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Entity(_) => None,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<&EntityAction> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Text(_) => None,
        }
    }
}

impl Serialize for SuggestionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Entity(entity) => entity.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// Entity-level suggestion: accept or reject a whole action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySuggestion {
    pub action: Action,
    pub suggested_value: EntityAction,
    /// Current snapshot; `None` for CREATE or when the entity is unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_value: Option<EntitySnapshot>,
}

/// Field-level suggestion: accept, reject or edit one scalar field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSuggestion {
    pub field_name: FieldName,
    /// Action of the entity the field belongs to.
    pub entity_action: Action,
    pub suggested_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SuggestionDetail {
    Entity(EntitySuggestion),
    Field(FieldSuggestion),
}

/// One addressable, reviewable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub path: SuggestionPath,
    pub entity_identifier: String,
    #[serde(flatten)]
    pub detail: SuggestionDetail,
}

impl Suggestion {
    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self.detail, SuggestionDetail::Entity(_))
    }

    #[must_use]
    pub const fn is_field(&self) -> bool {
        matches!(self.detail, SuggestionDetail::Field(_))
    }

    /// Action of the entity this suggestion belongs to.
    #[must_use]
    pub const fn action(&self) -> Action {
        match &self.detail {
            SuggestionDetail::Entity(e) => e.action,
            SuggestionDetail::Field(f) => f.entity_action,
        }
    }

    /// The proposed value, as stored when the suggestion is accepted as-is.
    #[must_use]
    pub fn suggested_value(&self) -> SuggestionValue {
        match &self.detail {
            SuggestionDetail::Entity(e) => SuggestionValue::Entity(e.suggested_value.clone()),
            SuggestionDetail::Field(f) => SuggestionValue::Text(f.suggested_value.clone()),
        }
    }

    /// Check that a custom override has the shape this suggestion resolves to.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError::ValueMismatch`] for text on an entity, an
    /// entity on a field, or an entity payload of the wrong kind.
    pub fn check_value(&self, value: &SuggestionValue) -> Result<(), SuggestionError> {
        let expected = match (&self.detail, value) {
            (SuggestionDetail::Field(_), SuggestionValue::Text(_))
            | (
                SuggestionDetail::Entity(EntitySuggestion {
                    suggested_value: EntityAction::Initiative(_),
                    ..
                }),
                SuggestionValue::Entity(EntityAction::Initiative(_)),
            )
            | (
                SuggestionDetail::Entity(EntitySuggestion {
                    suggested_value: EntityAction::Task(_),
                    ..
                }),
                SuggestionValue::Entity(EntityAction::Task(_)),
            ) => return Ok(()),
            (SuggestionDetail::Field(_), SuggestionValue::Entity(_)) => "a string",
            (SuggestionDetail::Entity(e), _) => match e.suggested_value {
                EntityAction::Initiative(_) => "an initiative action",
                EntityAction::Task(_) => "a task action",
            },
        };
        Err(SuggestionError::ValueMismatch {
            path: self.path.to_string(),
            expected,
        })
    }
}
