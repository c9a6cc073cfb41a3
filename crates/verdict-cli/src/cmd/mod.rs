pub mod accept;
pub mod completions;
pub mod status;
pub mod suggestions;

use std::path::Path;

use verdict_core::{ErrorCode, ReviewSession};

use crate::input::{apply_decisions, load_bundle, load_decisions};
use crate::output::{CliError, OutputMode, fail};

/// Load a bundle, normalize it, and replay an optional decisions file.
///
/// Failures are rendered in `output` mode before being returned.
pub fn open_session(
    bundle: &Path,
    decisions: Option<&Path>,
    output: OutputMode,
) -> anyhow::Result<ReviewSession> {
    let bundle = load_bundle(bundle)
        .map_err(|e| fail(output, &CliError::coded(format!("{e:#}"), ErrorCode::InputParseError)))?;
    let mut session = bundle
        .into_session()
        .map_err(|e| fail(output, &CliError::from(&e)))?;

    if let Some(path) = decisions {
        let decisions = load_decisions(path).map_err(|e| {
            fail(output, &CliError::coded(format!("{e:#}"), ErrorCode::InputParseError))
        })?;
        apply_decisions(&mut session, decisions).map_err(|e| fail(output, &CliError::from(&e)))?;
    }

    Ok(session)
}
