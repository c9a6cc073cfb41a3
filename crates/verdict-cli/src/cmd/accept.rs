//! `vd accept <bundle>`: emit the accepted change set.
//!
//! Replays decisions, applies the project's review gates, and prints the
//! managed initiative models ready for persistence.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};
use verdict_core::ErrorCode;
use verdict_core::config::ReviewConfig;
use verdict_core::model::managed::ManagedInitiativeModel;
use verdict_core::suggest::FieldName;

use crate::output::{CliError, OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `vd accept`.
#[derive(Args, Debug)]
pub struct AcceptArgs {
    /// Bundle JSON with improvements and current initiatives/tasks.
    pub bundle: PathBuf,

    /// Decisions JSON to replay before collecting changes.
    #[arg(long)]
    pub decisions: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct AcceptReport {
    all_resolved: bool,
    changes: Vec<ManagedInitiativeModel>,
    missing_required: Vec<String>,
}

/// Execute `vd accept`.
pub fn run_accept(
    args: &AcceptArgs,
    review: &ReviewConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let session = super::open_session(&args.bundle, args.decisions.as_deref(), output)?;

    let all_resolved = session.all_resolved();
    if review.require_all_resolved && !all_resolved {
        let progress = session.progress(None);
        return Err(fail(
            output,
            &CliError::coded(
                format!(
                    "{} of {} suggestions are still unresolved",
                    progress.unresolved(),
                    progress.total
                ),
                ErrorCode::UnresolvedSuggestions,
            ),
        ));
    }

    let changes = session.accepted_changes();
    let missing_required: Vec<String> = changes
        .iter()
        .flat_map(|change| {
            let owner = change.identifier().unwrap_or("(new initiative)").to_string();
            change
                .missing_required_fields()
                .into_iter()
                .map(move |missing| format!("{owner}: {missing}"))
        })
        .collect();

    if !missing_required.is_empty() {
        if !review.allow_missing_required {
            return Err(fail(
                output,
                &CliError::coded(
                    format!("accepted changes lack {}", missing_required.join(", ")),
                    ErrorCode::MissingRequiredFields,
                ),
            ));
        }
        warn!(missing = missing_required.len(), "accepted creates lack required fields");
    }

    info!(changes = changes.len(), all_resolved, "collected accepted changes");

    let report = AcceptReport {
        all_resolved,
        changes,
        missing_required,
    };

    render_mode(
        output,
        &report,
        |report, w| {
            for change in &report.changes {
                writeln!(
                    w,
                    "{} {}  tasks={}",
                    change.action(),
                    change.identifier().unwrap_or("-"),
                    change.tasks().len()
                )?;
            }
            for missing in &report.missing_required {
                writeln!(w, "missing {missing}")?;
            }
            Ok(())
        },
        |report, w| {
            pretty_section(w, &format!("Accepted changes ({})", report.changes.len()))?;
            for change in &report.changes {
                pretty_kv(
                    w,
                    &change.action().to_string(),
                    change.identifier().unwrap_or("(new initiative)"),
                )?;
                for task in change.tasks() {
                    writeln!(
                        w,
                        "  {} {}",
                        task.action(),
                        task.identifier()
                            .or_else(|| task.field(FieldName::Title))
                            .unwrap_or("(untitled)")
                    )?;
                }
            }
            if !report.missing_required.is_empty() {
                pretty_rule(w)?;
                for missing in &report.missing_required {
                    writeln!(w, "⚠ missing {missing}")?;
                }
            }
            if !report.all_resolved {
                pretty_rule(w)?;
                writeln!(w, "Some suggestions are still unresolved.")?;
            }
            Ok(())
        },
    )
}

