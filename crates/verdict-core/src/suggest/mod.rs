//! Suggestion construction: paths, normalization, original values, tree view.

pub mod normalize;
pub mod original;
pub mod path;
pub mod suggestion;
pub mod tree;

pub use normalize::normalize;
pub use original::{OriginalValue, resolve_original};
pub use path::{FieldName, PathError, SuggestionPath};
pub use suggestion::{
    EntityAction, EntitySuggestion, FieldSuggestion, Suggestion, SuggestionDetail,
    SuggestionValue,
};
pub use tree::{InitiativeNode, TaskNode, build_tree};
