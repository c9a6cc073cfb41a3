//! verdict-core library.
//!
//! Turns a batch of proposed initiative/task improvements into reviewable
//! suggestions, tracks accept/reject decisions per suggestion path, and
//! rebuilds the accepted change list.
//!
//! ```text
//! improvements + snapshots -> normalize -> suggestions -> ResolutionStore -> accepted_changes
//! ```
//!
//! [`session::ReviewSession`] bundles the pipeline behind one facade.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::SuggestionError`];
//!   config loading uses `anyhow::Result`.
//! - **Logging**: `tracing` macros only; the binary installs the subscriber.

pub mod config;
pub mod error;
pub mod model;
pub mod resolve;
pub mod session;
pub mod suggest;

pub use error::{ErrorCode, SuggestionError};
pub use session::{ResolutionProgress, ReviewSession};
