//! Accepted-change reconstruction.
//!
//! Walks the suggestion tree against the resolution store and rebuilds the
//! payloads to submit. Entity acceptance gates everything under it: a
//! rejected or unresolved initiative contributes nothing, whatever its
//! fields and tasks say.

use tracing::debug;

use crate::model::improvement::Action;
use crate::model::managed::{ManagedInitiativeModel, ManagedTaskModel};
use crate::suggest::suggestion::{EntityAction, Suggestion, SuggestionDetail};
use crate::suggest::tree::{InitiativeNode, TaskNode, build_tree};

use super::store::ResolutionStore;

/// Rebuild the accepted change list, one entry per accepted initiative in
/// suggestion order.
#[must_use]
pub fn accepted_changes(
    suggestions: &[Suggestion],
    store: &ResolutionStore,
) -> Vec<ManagedInitiativeModel> {
    let changes: Vec<ManagedInitiativeModel> = build_tree(suggestions)
        .iter()
        .filter_map(|node| accepted_initiative(node, store))
        .collect();
    debug!(changes = changes.len(), "reconstructed accepted changes");
    changes
}

fn accepted_initiative(
    node: &InitiativeNode<'_>,
    store: &ResolutionStore,
) -> Option<ManagedInitiativeModel> {
    let payload = accepted_payload(node.entity, store)?;
    let EntityAction::Initiative(improvement) = payload else {
        return None;
    };

    let mut model = ManagedInitiativeModel::from_improvement(improvement);
    if model.action() == Action::Delete {
        return Some(model);
    }

    for field in &node.fields {
        if let SuggestionDetail::Field(detail) = &field.detail {
            model.set_field(detail.field_name, accepted_text(field, store));
        }
    }

    let tasks: Vec<ManagedTaskModel> = node
        .tasks
        .iter()
        .filter_map(|task| accepted_task(task, store))
        .collect();
    model.set_tasks((!tasks.is_empty()).then_some(tasks));
    Some(model)
}

fn accepted_task(node: &TaskNode<'_>, store: &ResolutionStore) -> Option<ManagedTaskModel> {
    let EntityAction::Task(improvement) = accepted_payload(node.entity, store)? else {
        return None;
    };

    let mut model = ManagedTaskModel::from_improvement(improvement);
    if model.action() != Action::Delete {
        for field in &node.fields {
            if let SuggestionDetail::Field(detail) = &field.detail {
                model.set_field(detail.field_name, accepted_text(field, store));
            }
        }
    }
    Some(model)
}

/// The accepted entity payload, or `None` when the entity is not accepted.
fn accepted_payload<'a>(
    suggestion: &Suggestion,
    store: &'a ResolutionStore,
) -> Option<&'a EntityAction> {
    let state = store.state(&suggestion.path);
    if !state.is_accepted {
        return None;
    }
    state.resolved_value.as_entity()
}

/// The accepted text of a field, or `None` when it is rejected or unresolved.
fn accepted_text(suggestion: &Suggestion, store: &ResolutionStore) -> Option<String> {
    let state = store.state(&suggestion.path);
    state
        .is_accepted
        .then(|| state.resolved_value.as_text().map(ToOwned::to_owned))
        .flatten()
}
