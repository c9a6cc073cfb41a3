//! Current initiative and task snapshots.
//!
//! Snapshots are the pre-change state the reviewer compares suggestions
//! against. They are read-only inputs; [`Snapshots`] indexes them by
//! identifier so lookups are O(1).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::suggest::path::FieldName;

/// An initiative as it currently exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiative {
    /// Numeric id, when the source system provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub identifier: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_identifier: Option<String>,
}

impl Initiative {
    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Title => Some(&self.title),
            FieldName::Description => self.description.as_deref(),
        }
    }
}

/// A task as it currently exists.
///
/// The owning initiative is given either by identifier or by numeric
/// initiative id; the identifier wins when both are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Numeric id, when the source system provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub identifier: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_id: Option<u64>,
}

impl Task {
    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Title => Some(&self.title),
            FieldName::Description => self.description.as_deref(),
        }
    }
}

/// Either kind of snapshot, as attached to an entity suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntitySnapshot {
    Initiative(Initiative),
    Task(Task),
}

/// Identifier-indexed view over the current initiatives and tasks.
///
/// When an identifier appears more than once, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct Snapshots {
    initiatives: Vec<Initiative>,
    tasks: Vec<Task>,
    initiative_by_identifier: HashMap<String, usize>,
    initiative_by_id: HashMap<u64, usize>,
    task_by_identifier: HashMap<String, usize>,
}

impl Snapshots {
    #[must_use]
    pub fn new(initiatives: Vec<Initiative>, tasks: Vec<Task>) -> Self {
        let mut initiative_by_identifier = HashMap::with_capacity(initiatives.len());
        let mut initiative_by_id = HashMap::with_capacity(initiatives.len());
        for (idx, initiative) in initiatives.iter().enumerate() {
            initiative_by_identifier
                .entry(initiative.identifier.clone())
                .or_insert(idx);
            if let Some(id) = initiative.id {
                initiative_by_id.entry(id).or_insert(idx);
            }
        }

        let mut task_by_identifier = HashMap::with_capacity(tasks.len());
        for (idx, task) in tasks.iter().enumerate() {
            task_by_identifier.entry(task.identifier.clone()).or_insert(idx);
        }

        Self {
            initiatives,
            tasks,
            initiative_by_identifier,
            initiative_by_id,
            task_by_identifier,
        }
    }

    #[must_use]
    pub fn initiative(&self, identifier: &str) -> Option<&Initiative> {
        self.initiative_by_identifier
            .get(identifier)
            .map(|&idx| &self.initiatives[idx])
    }

    #[must_use]
    pub fn task(&self, identifier: &str) -> Option<&Task> {
        self.task_by_identifier
            .get(identifier)
            .map(|&idx| &self.tasks[idx])
    }

    /// Identifier of the initiative that owns `task`.
    ///
    /// Falls back to resolving the numeric `initiative_id` against the
    /// initiative snapshot when the task does not name its initiative
    /// identifier directly.
    #[must_use]
    pub fn owning_initiative<'a>(&'a self, task: &'a Task) -> Option<&'a str> {
        if let Some(identifier) = task.initiative_identifier.as_deref() {
            return Some(identifier);
        }
        let id = task.initiative_id?;
        self.initiative_by_id
            .get(&id)
            .map(|&idx| self.initiatives[idx].identifier.as_str())
    }

    #[must_use]
    pub fn initiatives(&self) -> &[Initiative] {
        &self.initiatives
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}
