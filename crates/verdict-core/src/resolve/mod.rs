//! Resolution tracking and accepted-change reconstruction.

pub mod accepted;
pub mod store;

pub use accepted::accepted_changes;
pub use store::{Resolution, ResolutionStore, ResolvedValue};
