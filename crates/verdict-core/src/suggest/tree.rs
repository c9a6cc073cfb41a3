//! Two-level tree view over a flat suggestion list.
//!
//! Built by grouping on path structure, not string prefixes. Nodes borrow
//! from the list; the list stays the single source of truth.

use std::collections::HashMap;

use super::path::SuggestionPath;
use super::suggestion::Suggestion;

/// A task entity suggestion with its field suggestions.
#[derive(Debug, Clone)]
pub struct TaskNode<'a> {
    pub entity: &'a Suggestion,
    pub fields: Vec<&'a Suggestion>,
}

/// An initiative entity suggestion with its fields and tasks.
#[derive(Debug, Clone)]
pub struct InitiativeNode<'a> {
    pub entity: &'a Suggestion,
    pub fields: Vec<&'a Suggestion>,
    pub tasks: Vec<TaskNode<'a>>,
}

/// Group `suggestions` into initiative nodes, in list order.
///
/// Field and task suggestions whose entity suggestion is absent from the
/// list have nowhere to attach and are skipped.
#[must_use]
pub fn build_tree(suggestions: &[Suggestion]) -> Vec<InitiativeNode<'_>> {
    let mut nodes: Vec<InitiativeNode<'_>> = Vec::new();
    let mut initiatives: HashMap<&str, usize> = HashMap::new();
    let mut tasks: HashMap<(&str, &str), (usize, usize)> = HashMap::new();

    for suggestion in suggestions {
        match &suggestion.path {
            SuggestionPath::Initiative { initiative } => {
                initiatives.insert(initiative.as_str(), nodes.len());
                nodes.push(InitiativeNode {
                    entity: suggestion,
                    fields: Vec::new(),
                    tasks: Vec::new(),
                });
            }
            SuggestionPath::InitiativeField { initiative, .. } => {
                if let Some(&idx) = initiatives.get(initiative.as_str()) {
                    nodes[idx].fields.push(suggestion);
                }
            }
            SuggestionPath::Task { initiative, task } => {
                if let Some(&idx) = initiatives.get(initiative.as_str()) {
                    let node = &mut nodes[idx];
                    tasks.insert((initiative.as_str(), task.as_str()), (idx, node.tasks.len()));
                    node.tasks.push(TaskNode {
                        entity: suggestion,
                        fields: Vec::new(),
                    });
                }
            }
            SuggestionPath::TaskField {
                initiative, task, ..
            } => {
                if let Some(&(idx, task_idx)) = tasks.get(&(initiative.as_str(), task.as_str())) {
                    nodes[idx].tasks[task_idx].fields.push(suggestion);
                }
            }
        }
    }

    nodes
}
