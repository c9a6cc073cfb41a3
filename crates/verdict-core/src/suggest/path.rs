//! Addressable suggestion paths.
//!
//! Every suggestion has a stable path that renders to a dotted string:
//!
//! | Path | Addresses |
//! |---|---|
//! | `initiative.<id>` | initiative entity |
//! | `initiative.<id>.<field>` | initiative field |
//! | `initiative.<id>.tasks.<taskId>` | nested task entity |
//! | `initiative.<id>.tasks.<taskId>.<field>` | nested task field |
//!
//! Internally paths are a structured enum; containment checks compare
//! segments rather than string prefixes, so `initiative.INIT-1` does not
//! contain `initiative.INIT-12`.
//!
//! Identifiers are not escaped, so normalization refuses any initiative or
//! task key containing `.` with [`PathError::SeparatorInIdentifier`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const ROOT_SEGMENT: &str = "initiative";
const TASKS_SEGMENT: &str = "tasks";

/// Prefix for keys of task creations nested under an initiative.
pub const NEW_TASK_PREFIX: &str = "new-task-";

// ---------------------------------------------------------------------------
// FieldName
// ---------------------------------------------------------------------------

/// A reviewable scalar field on an initiative or task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Title,
    Description,
}

impl FieldName {
    /// All fields in declaration (and emission) order.
    pub const ALL: [Self; 2] = [Self::Title, Self::Description];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(Self::Title),
            "description" => Ok(Self::Description),
            _ => Err(UnknownField { raw: s.to_string() }),
        }
    }
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field '{raw}': expected one of title, description")]
pub struct UnknownField {
    pub raw: String,
}

// ---------------------------------------------------------------------------
// PathError
// ---------------------------------------------------------------------------

/// Error returned when a dotted string is not a valid suggestion path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("invalid suggestion path '{raw}': {reason}")]
    Malformed { raw: String, reason: &'static str },

    #[error("invalid suggestion path '{raw}': {source}")]
    UnknownField {
        raw: String,
        #[source]
        source: UnknownField,
    },

    /// Identifiers become path segments and must not contain `.`.
    #[error("identifier '{identifier}' contains '.', which separates path segments")]
    SeparatorInIdentifier { identifier: String },
}

// ---------------------------------------------------------------------------
// SuggestionPath
// ---------------------------------------------------------------------------

/// Structured address of one suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SuggestionPath {
    Initiative {
        initiative: String,
    },
    InitiativeField {
        initiative: String,
        field: FieldName,
    },
    Task {
        initiative: String,
        task: String,
    },
    TaskField {
        initiative: String,
        task: String,
        field: FieldName,
    },
}

impl SuggestionPath {
    pub fn initiative(initiative: impl Into<String>) -> Self {
        Self::Initiative {
            initiative: initiative.into(),
        }
    }

    pub fn initiative_field(initiative: impl Into<String>, field: FieldName) -> Self {
        Self::InitiativeField {
            initiative: initiative.into(),
            field,
        }
    }

    pub fn task(initiative: impl Into<String>, task: impl Into<String>) -> Self {
        Self::Task {
            initiative: initiative.into(),
            task: task.into(),
        }
    }

    pub fn task_field(
        initiative: impl Into<String>,
        task: impl Into<String>,
        field: FieldName,
    ) -> Self {
        Self::TaskField {
            initiative: initiative.into(),
            task: task.into(),
            field,
        }
    }

    /// Key of the initiative this path lives under.
    #[must_use]
    pub fn initiative_key(&self) -> &str {
        match self {
            Self::Initiative { initiative }
            | Self::InitiativeField { initiative, .. }
            | Self::Task { initiative, .. }
            | Self::TaskField { initiative, .. } => initiative,
        }
    }

    /// Key of the task this path lives under, if any.
    #[must_use]
    pub fn task_key(&self) -> Option<&str> {
        match self {
            Self::Task { task, .. } | Self::TaskField { task, .. } => Some(task.as_str()),
            Self::Initiative { .. } | Self::InitiativeField { .. } => None,
        }
    }

    #[must_use]
    pub const fn field(&self) -> Option<FieldName> {
        match self {
            Self::InitiativeField { field, .. } | Self::TaskField { field, .. } => Some(*field),
            Self::Initiative { .. } | Self::Task { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_entity(&self) -> bool {
        matches!(self, Self::Initiative { .. } | Self::Task { .. })
    }

    #[must_use]
    pub const fn is_field(&self) -> bool {
        !self.is_entity()
    }

    /// Path of the entity a field belongs to. Entity paths return themselves.
    #[must_use]
    pub fn entity(&self) -> Self {
        match self {
            Self::InitiativeField { initiative, .. } => Self::initiative(initiative.clone()),
            Self::TaskField {
                initiative, task, ..
            } => Self::task(initiative.clone(), task.clone()),
            Self::Initiative { .. } | Self::Task { .. } => self.clone(),
        }
    }

    /// The enclosing node: field → entity, task → initiative.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Initiative { .. } => None,
            Self::InitiativeField { initiative, .. } | Self::Task { initiative, .. } => {
                Some(Self::initiative(initiative.clone()))
            }
            Self::TaskField {
                initiative, task, ..
            } => Some(Self::task(initiative.clone(), task.clone())),
        }
    }

    /// True when `self` equals `prefix` or is nested under it.
    #[must_use]
    pub fn is_within(&self, prefix: &Self) -> bool {
        match prefix {
            Self::Initiative { initiative } => self.initiative_key() == initiative.as_str(),
            Self::Task { initiative, task } => {
                self.initiative_key() == initiative.as_str() && self.task_key() == Some(task.as_str())
            }
            Self::InitiativeField { .. } | Self::TaskField { .. } => self == prefix,
        }
    }
}

impl fmt::Display for SuggestionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiative { initiative } => write!(f, "{ROOT_SEGMENT}.{initiative}"),
            Self::InitiativeField { initiative, field } => {
                write!(f, "{ROOT_SEGMENT}.{initiative}.{field}")
            }
            Self::Task { initiative, task } => {
                write!(f, "{ROOT_SEGMENT}.{initiative}.{TASKS_SEGMENT}.{task}")
            }
            Self::TaskField {
                initiative,
                task,
                field,
            } => write!(
                f,
                "{ROOT_SEGMENT}.{initiative}.{TASKS_SEGMENT}.{task}.{field}"
            ),
        }
    }
}

impl FromStr for SuggestionPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| PathError::Malformed {
            raw: s.to_string(),
            reason,
        };
        let field = |raw: &str| {
            raw.parse::<FieldName>()
                .map_err(|source| PathError::UnknownField {
                    raw: s.to_string(),
                    source,
                })
        };

        let segments: Vec<&str> = s.split('.').collect();
        if segments.first() != Some(&ROOT_SEGMENT) {
            return Err(malformed("expected a path starting with 'initiative.'"));
        }
        if segments.iter().any(|seg| seg.is_empty()) {
            return Err(malformed("empty path segment"));
        }

        match segments.as_slice() {
            [_, initiative] => Ok(Self::initiative(*initiative)),
            [_, _, TASKS_SEGMENT] => Err(malformed("missing task identifier after 'tasks'")),
            [_, initiative, name] => Ok(Self::initiative_field(*initiative, field(*name)?)),
            [_, initiative, TASKS_SEGMENT, task] => Ok(Self::task(*initiative, *task)),
            [_, initiative, TASKS_SEGMENT, task, name] => {
                Ok(Self::task_field(*initiative, *task, field(*name)?))
            }
            [_] => Err(malformed("missing initiative identifier")),
            _ => Err(malformed("unexpected segments")),
        }
    }
}

impl Serialize for SuggestionPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SuggestionPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
