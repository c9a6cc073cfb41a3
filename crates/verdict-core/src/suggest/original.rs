//! Pre-change value lookup.
//!
//! Entity suggestions show the current snapshot of the entity they change;
//! field suggestions show the current value of that one field. CREATE
//! actions never have an original. An UPDATE or DELETE whose target is
//! missing from the snapshots also has none; that degrades the display but
//! is not an error.

use serde::Serialize;

use crate::model::entity::{EntitySnapshot, Snapshots};
use crate::model::improvement::Action;

use super::path::{FieldName, SuggestionPath};
use super::suggestion::{Suggestion, SuggestionDetail};

/// The pre-change value of any suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OriginalValue {
    Entity(EntitySnapshot),
    Text(String),
}

/// Look up the pre-change value of `suggestion`.
///
/// Field originals are read off the owning entity's snapshot, identified by
/// the suggestion's `entity_identifier`.
#[must_use]
pub fn resolve_original(suggestion: &Suggestion, snapshots: &Snapshots) -> Option<OriginalValue> {
    match &suggestion.detail {
        SuggestionDetail::Entity(entity) => original_entity(
            &suggestion.path,
            entity.action,
            &suggestion.entity_identifier,
            snapshots,
        )
        .map(OriginalValue::Entity),
        SuggestionDetail::Field(field) => original_field(
            &suggestion.path,
            field.entity_action,
            &suggestion.entity_identifier,
            field.field_name,
            snapshots,
        )
        .map(OriginalValue::Text),
    }
}

fn original_entity(
    path: &SuggestionPath,
    action: Action,
    identifier: &str,
    snapshots: &Snapshots,
) -> Option<EntitySnapshot> {
    if action == Action::Create {
        return None;
    }
    if path.task_key().is_some() {
        snapshots
            .task(identifier)
            .cloned()
            .map(EntitySnapshot::Task)
    } else {
        snapshots
            .initiative(identifier)
            .cloned()
            .map(EntitySnapshot::Initiative)
    }
}

fn original_field(
    path: &SuggestionPath,
    entity_action: Action,
    identifier: &str,
    field: FieldName,
    snapshots: &Snapshots,
) -> Option<String> {
    if entity_action == Action::Create {
        return None;
    }
    let value = if path.task_key().is_some() {
        snapshots.task(identifier)?.field(field)
    } else {
        snapshots.initiative(identifier)?.field(field)
    };
    value.map(ToOwned::to_owned)
}

/// Fill in `original_value` on every suggestion from the snapshots.
pub fn attach_originals(suggestions: &mut [Suggestion], snapshots: &Snapshots) {
    for suggestion in suggestions.iter_mut() {
        let original = resolve_original(suggestion, snapshots);
        match (&mut suggestion.detail, original) {
            (SuggestionDetail::Entity(entity), Some(OriginalValue::Entity(snapshot))) => {
                entity.original_value = Some(snapshot);
            }
            (SuggestionDetail::Field(field), Some(OriginalValue::Text(text))) => {
                field.original_value = Some(text);
            }
            (SuggestionDetail::Entity(entity), _) => entity.original_value = None,
            (SuggestionDetail::Field(field), _) => field.original_value = None,
        }
    }
}
