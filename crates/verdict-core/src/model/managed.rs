//! Accepted change payloads, ready to hand to persistence.
//!
//! These mirror the improvement types, but every reviewable field is
//! optional: a field whose suggestion was rejected or left unresolved is
//! absent from the payload rather than defaulted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::suggest::path::FieldName;

use super::improvement::{Action, InitiativeImprovement, TaskImprovement};

/// One accepted initiative change, with its accepted task changes nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum ManagedInitiativeModel {
    Create(ManagedInitiativeCreate),
    Update(ManagedInitiativeUpdate),
    Delete(ManagedDelete),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedInitiativeCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub workspace_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<ManagedTaskModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedInitiativeUpdate {
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
    pub tasks: Option<Vec<ManagedTaskModel>>,
}

/// DELETE carries the identifier and nothing else, for both entity kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDelete {
    pub identifier: String,
}

/// One accepted task change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "UPPERCASE")]
pub enum ManagedTaskModel {
    Create(ManagedTaskCreate),
    Update(ManagedTaskUpdate),
    Delete(ManagedDelete),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTaskCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedTaskUpdate {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A required field an accepted CREATE ended up without.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    /// `initiative` or `tasks[<n>]`, relative to the accepted change.
    pub location: String,
    pub field: FieldName,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.location, self.field)
    }
}

impl ManagedInitiativeModel {
    /// Base payload of an accepted improvement, without nested tasks.
    #[must_use]
    pub fn from_improvement(improvement: &InitiativeImprovement) -> Self {
        match improvement {
            InitiativeImprovement::Create(c) => Self::Create(ManagedInitiativeCreate {
                title: Some(c.title.clone()),
                description: Some(c.description.clone()),
                kind: c.kind.clone(),
                workspace_identifier: c.workspace_identifier.clone(),
                tasks: None,
            }),
            InitiativeImprovement::Update(u) => Self::Update(ManagedInitiativeUpdate {
                identifier: u.identifier.clone(),
                title: u.title.clone(),
                description: u.description.clone(),
                kind: u.kind.clone(),
                status: u.status.clone(),
                tasks: None,
            }),
            InitiativeImprovement::Delete(d) => Self::Delete(ManagedDelete {
                identifier: d.identifier.clone(),
            }),
        }
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Update(_) => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(u) => Some(&u.identifier),
            Self::Delete(d) => Some(&d.identifier),
        }
    }

    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match (self, field) {
            (Self::Create(c), FieldName::Title) => c.title.as_deref(),
            (Self::Create(c), FieldName::Description) => c.description.as_deref(),
            (Self::Update(u), FieldName::Title) => u.title.as_deref(),
            (Self::Update(u), FieldName::Description) => u.description.as_deref(),
            (Self::Delete(_), _) => None,
        }
    }

    /// Overwrite one reviewable field. No effect on DELETE.
    pub fn set_field(&mut self, field: FieldName, value: Option<String>) {
        let slot = match (self, field) {
            (Self::Create(c), FieldName::Title) => &mut c.title,
            (Self::Create(c), FieldName::Description) => &mut c.description,
            (Self::Update(u), FieldName::Title) => &mut u.title,
            (Self::Update(u), FieldName::Description) => &mut u.description,
            (Self::Delete(_), _) => return,
        };
        *slot = value;
    }

    #[must_use]
    pub fn tasks(&self) -> &[ManagedTaskModel] {
        match self {
            Self::Create(c) => c.tasks.as_deref().unwrap_or_default(),
            Self::Update(u) => u.tasks.as_deref().unwrap_or_default(),
            Self::Delete(_) => &[],
        }
    }

    /// Replace the nested task list. No effect on DELETE.
    pub fn set_tasks(&mut self, tasks: Option<Vec<ManagedTaskModel>>) {
        match self {
            Self::Create(c) => c.tasks = tasks,
            Self::Update(u) => u.tasks = tasks,
            Self::Delete(_) => {}
        }
    }

    /// Required fields that accepted CREATEs in this change lack.
    ///
    /// Covers the initiative itself when it is a CREATE and every nested
    /// task CREATE.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        if self.action() == Action::Create {
            missing.extend(
                FieldName::ALL
                    .into_iter()
                    .filter(|&f| self.field(f).is_none())
                    .map(|field| MissingField {
                        location: "initiative".into(),
                        field,
                    }),
            );
        }
        for (idx, task) in self.tasks().iter().enumerate() {
            if task.action() != Action::Create {
                continue;
            }
            for field in FieldName::ALL {
                if task.field(field).is_none() {
                    missing.push(MissingField {
                        location: format!("tasks[{idx}]"),
                        field,
                    });
                }
            }
        }
        missing
    }
}

impl ManagedTaskModel {
    #[must_use]
    pub fn from_improvement(improvement: &TaskImprovement) -> Self {
        match improvement {
            TaskImprovement::Create(c) => Self::Create(ManagedTaskCreate {
                title: Some(c.title.clone()),
                description: Some(c.description.clone()),
                initiative_identifier: c.initiative_identifier.clone(),
            }),
            TaskImprovement::Update(u) => Self::Update(ManagedTaskUpdate {
                identifier: u.identifier.clone(),
                title: u.title.clone(),
                description: u.description.clone(),
            }),
            TaskImprovement::Delete(d) => Self::Delete(ManagedDelete {
                identifier: d.identifier.clone(),
            }),
        }
    }

    #[must_use]
    pub const fn action(&self) -> Action {
        match self {
            Self::Create(_) => Action::Create,
            Self::Update(_) => Action::Update,
            Self::Delete(_) => Action::Delete,
        }
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Create(_) => None,
            Self::Update(u) => Some(&u.identifier),
            Self::Delete(d) => Some(&d.identifier),
        }
    }

    #[must_use]
    pub fn field(&self, field: FieldName) -> Option<&str> {
        match (self, field) {
            (Self::Create(c), FieldName::Title) => c.title.as_deref(),
            (Self::Create(c), FieldName::Description) => c.description.as_deref(),
            (Self::Update(u), FieldName::Title) => u.title.as_deref(),
            (Self::Update(u), FieldName::Description) => u.description.as_deref(),
            (Self::Delete(_), _) => None,
        }
    }

    pub fn set_field(&mut self, field: FieldName, value: Option<String>) {
        let slot = match (self, field) {
            (Self::Create(c), FieldName::Title) => &mut c.title,
            (Self::Create(c), FieldName::Description) => &mut c.description,
            (Self::Update(u), FieldName::Title) => &mut u.title,
            (Self::Update(u), FieldName::Description) => &mut u.description,
            (Self::Delete(_), _) => return,
        };
        *slot = value;
    }
}
