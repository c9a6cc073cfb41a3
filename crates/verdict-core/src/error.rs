use std::fmt;

use crate::suggest::path::PathError;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    InputParseError,
    TaskNotFound,
    InitiativeUnresolved,
    OrphanTaskCreate,
    InvalidPath,
    ValueMismatch,
    UnresolvedSuggestions,
    MissingRequiredFields,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InputParseError => "E1002",
            Self::TaskNotFound => "E2001",
            Self::InitiativeUnresolved => "E2002",
            Self::OrphanTaskCreate => "E2003",
            Self::InvalidPath => "E3001",
            Self::ValueMismatch => "E3002",
            Self::UnresolvedSuggestions => "E4001",
            Self::MissingRequiredFields => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Input file parse error",
            Self::TaskNotFound => "Task not found in current tasks",
            Self::InitiativeUnresolved => "Owning initiative cannot be determined",
            Self::OrphanTaskCreate => "Task creation has no initiative",
            Self::InvalidPath => "Invalid suggestion path",
            Self::ValueMismatch => "Resolution value does not fit the suggestion",
            Self::UnresolvedSuggestions => "Suggestions left unresolved",
            Self::MissingRequiredFields => "Accepted creation lacks required fields",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .verdict/config.toml and retry."),
            Self::InputParseError => {
                Some("Check the bundle/decisions JSON against the documented shape.")
            }
            Self::TaskNotFound => {
                Some("Refresh the current task list; the task may have been deleted.")
            }
            Self::InitiativeUnresolved => {
                Some("Include the task's initiative in the current initiative list.")
            }
            Self::OrphanTaskCreate => {
                Some("Set initiative_identifier on standalone task creations.")
            }
            Self::InvalidPath => Some(
                "Use initiative.<id>[.<field>] or initiative.<id>.tasks.<taskId>[.<field>].",
            ),
            Self::ValueMismatch => {
                Some("Field paths take a string; entity paths take an action object.")
            }
            Self::UnresolvedSuggestions => Some("Accept or reject every suggestion first."),
            Self::MissingRequiredFields => {
                Some("Accept the title/description suggestions of created entities.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while building or resolving suggestions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SuggestionError {
    /// A standalone task UPDATE/DELETE names a task that does not exist.
    #[error("Task {identifier} not found in TasksContext")]
    TaskNotFound { identifier: String },

    /// The task exists but names no initiative that can be found.
    #[error("Task {identifier} has no resolvable owning initiative")]
    InitiativeUnresolved { identifier: String },

    /// A standalone task CREATE without `initiative_identifier`.
    #[error("task improvement '{key}' creates a task without an initiative_identifier")]
    OrphanTaskCreate { key: String },

    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// A custom resolution value of the wrong shape for its path.
    #[error("resolution value for {path} must be {expected}")]
    ValueMismatch { path: String, expected: &'static str },
}

impl SuggestionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::InitiativeUnresolved { .. } => ErrorCode::InitiativeUnresolved,
            Self::OrphanTaskCreate { .. } => ErrorCode::OrphanTaskCreate,
            Self::InvalidPath(_) => ErrorCode::InvalidPath,
            Self::ValueMismatch { .. } => ErrorCode::ValueMismatch,
        }
    }
}
