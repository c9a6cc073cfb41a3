//! Proposed edits to initiatives and tasks.
//!
//! An improvement is a CREATE, UPDATE or DELETE action tagged on its
//! `action` field. Initiative improvements may carry nested task
//! improvements in `tasks`; task improvements can also arrive on their own,
//! keyed by task identifier (or `new-<n>` for creations).

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

use crate::suggest::path::FieldName;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// The three kinds of change an improvement can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    /// Canonical upper-case wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Initiative improvements
// ---------------------------------------------------------------------------

/// A proposed change to an initiative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum InitiativeImprovement {
    Create(CreateInitiative),
    Update(UpdateInitiative),
    Delete(DeleteInitiative),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInitiative {
    pub title: String,
    pub description: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub workspace_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskImprovement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInitiative {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskImprovement>>,
}

impl UpdateInitiative {
    /// An UPDATE that changes no initiative fields and only carries tasks.
    ///
    /// Used to give orphaned task improvements an owning initiative action.
    #[must_use]
    pub const fn tasks_only(identifier: String, tasks: Vec<TaskImprovement>) -> Self {
        Self {
            identifier,
            title: None,
            description: None,
            kind: None,
            status: None,
            tasks: Some(tasks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteInitiative {
    pub identifier: String,
}

impl InitiativeImprovement {
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Update(_) => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }

    /// Stable identifier of the target initiative. `None` for CREATE.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(u) => Some(&u.identifier),
            Self::Delete(d) => Some(&d.identifier),
        }
    }

    /// The proposed value of a reviewable field, if the payload sets it.
    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match (self, field) {
            (Self::Create(c), FieldName::Title) => Some(&c.title),
            (Self::Create(c), FieldName::Description) => Some(&c.description),
            (Self::Update(u), FieldName::Title) => u.title.as_deref(),
            (Self::Update(u), FieldName::Description) => u.description.as_deref(),
            (Self::Delete(_), _) => None,
        }
    }

    /// Nested task improvements. DELETE never carries any.
    #[must_use]
    pub fn tasks(&self) -> &[TaskImprovement] {
        match self {
            Self::Create(c) => c.tasks.as_deref().unwrap_or_default(),
            Self::Update(u) => u.tasks.as_deref().unwrap_or_default(),
            Self::Delete(_) => &[],
        }
    }

    /// Replace the nested task list. No effect on DELETE.
    pub fn set_tasks(&mut self, tasks: Vec<TaskImprovement>) {
        match self {
            Self::Create(c) => c.tasks = Some(tasks),
            Self::Update(u) => u.tasks = Some(tasks),
            Self::Delete(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Task improvements
// ---------------------------------------------------------------------------

/// A proposed change to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum TaskImprovement {
    Create(CreateTask),
    Update(UpdateTask),
    Delete(DeleteTask),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    /// Owning initiative. Required when the task is proposed on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTask {
    pub identifier: String,
}

impl TaskImprovement {
    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Update(_) => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }

    /// Stable identifier of the target task. `None` for CREATE.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(u) => Some(&u.identifier),
            Self::Delete(d) => Some(&d.identifier),
        }
    }

    /// The proposed value of a reviewable field, if the payload sets it.
    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match (self, field) {
            (Self::Create(c), FieldName::Title) => Some(&c.title),
            (Self::Create(c), FieldName::Description) => Some(&c.description),
            (Self::Update(u), FieldName::Title) => u.title.as_deref(),
            (Self::Update(u), FieldName::Description) => u.description.as_deref(),
            (Self::Delete(_), _) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ImprovementMap: declaration-ordered keyed entries
// ---------------------------------------------------------------------------

/// Improvements keyed by entity identifier (or `new-<n>` for creations).
///
/// Iteration follows declaration order, which is what drives suggestion
/// order. Deserializing from a JSON object keeps the document order of its
/// keys. Inserting an existing key replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImprovementMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for ImprovementMap<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> ImprovementMap<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
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

impl<K: Into<String>, T> FromIterator<(K, T)> for ImprovementMap<T> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<T: Serialize> Serialize for ImprovementMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k, v)))
    }
}

struct ImprovementMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ImprovementMapVisitor<T> {
    type Value = ImprovementMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of improvement key to improvement")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = ImprovementMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ImprovementMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ImprovementMapVisitor(PhantomData))
    }
}

/// The two improvement maps proposed together in one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Improvements {
    #[serde(default)]
    pub initiative_improvements: ImprovementMap<InitiativeImprovement>,
    #[serde(default)]
    pub task_improvements: ImprovementMap<TaskImprovement>,
}

impl Improvements {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.initiative_improvements.is_empty() && self.task_improvements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiative_update_parses_with_nested_tasks() {
        let json = r#"{
            "action": "UPDATE",
            "identifier": "INIT-1",
            "title": "New title",
            "type": "EPIC",
            "tasks": [
                {"action": "CREATE", "title": "T", "description": "D"},
                {"action": "DELETE", "identifier": "TASK-9"}
            ]
        }"#;
        let imp: InitiativeImprovement = serde_json::from_str(json).expect("parse");
        assert_eq!(imp.action(), Action::Update);
        assert_eq!(imp.identifier(), Some("INIT-1"));
        assert_eq!(imp.field(FieldName::Title), Some("New title"));
        assert_eq!(imp.field(FieldName::Description), None);
        assert_eq!(imp.tasks().len(), 2);
        assert_eq!(imp.tasks()[1].identifier(), Some("TASK-9"));
        let InitiativeImprovement::Update(update) = imp else {
            panic!("expected update");
        };
        assert_eq!(update.kind.as_deref(), Some("EPIC"));
    }

    #[test]
    fn delete_serializes_identifier_only() {
        let imp = InitiativeImprovement::Delete(DeleteInitiative {
            identifier: "INIT-2".into(),
        });
        let value = serde_json::to_value(&imp).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"action": "DELETE", "identifier": "INIT-2"})
        );
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = serde_json::from_str::<TaskImprovement>(r#"{"action": "MOVE", "identifier": "X"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn improvement_map_keeps_document_order() {
        let json = r#"{
            "new-1": {"action": "CREATE", "title": "b", "description": "", "workspace_identifier": "W"},
            "INIT-9": {"action": "DELETE", "identifier": "INIT-9"},
            "new-0": {"action": "CREATE", "title": "a", "description": "", "workspace_identifier": "W"}
        }"#;
        let map: ImprovementMap<InitiativeImprovement> = serde_json::from_str(json).expect("parse");
        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["new-1", "INIT-9", "new-0"]);
    }

    #[test]
    fn improvement_map_insert_replaces_in_place() {
        let mut map = ImprovementMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        let entries: Vec<(&str, &i32)> = map.iter().collect();
        assert_eq!(entries, [("a", &3), ("b", &2)]);
        assert_eq!(map.get("a"), Some(&3));
    }

    #[test]
    fn set_tasks_ignores_delete() {
        let mut imp = InitiativeImprovement::Delete(DeleteInitiative {
            identifier: "INIT-3".into(),
        });
        imp.set_tasks(vec![TaskImprovement::Delete(DeleteTask {
            identifier: "TASK-1".into(),
        })]);
        assert!(imp.tasks().is_empty());
    }
}
