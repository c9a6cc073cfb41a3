//! `vd status <bundle>`: resolution progress.
//!
//! Overall counts plus one row per initiative. With `--prefix`, only the
//! suggestions within that path are counted.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use verdict_core::suggest::SuggestionPath;
use verdict_core::{ResolutionProgress, SuggestionError};

use crate::output::{
    CliError, OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode,
};

/// Arguments for `vd status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bundle JSON with improvements and current initiatives/tasks.
    pub bundle: PathBuf,

    /// Decisions JSON to replay before reporting.
    #[arg(long)]
    pub decisions: Option<PathBuf>,

    /// Restrict counts to one initiative or task path.
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
struct InitiativeStatus {
    path: SuggestionPath,
    #[serde(flatten)]
    progress: ResolutionProgress,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<SuggestionPath>,
    fully_resolved: bool,
    #[serde(flatten)]
    progress: ResolutionProgress,
    initiatives: Vec<InitiativeStatus>,
}

/// Execute `vd status`.
pub fn run_status(args: &StatusArgs, output: OutputMode) -> anyhow::Result<()> {
    let prefix = args
        .prefix
        .as_deref()
        .map(str::parse::<SuggestionPath>)
        .transpose()
        .map_err(|e| fail(output, &CliError::from(&SuggestionError::from(e))))?;
    let session = super::open_session(&args.bundle, args.decisions.as_deref(), output)?;
    let prefix = prefix.as_ref();

    let initiatives = session
        .tree()
        .iter()
        .map(|node| &node.entity.path)
        .filter(|path| prefix.is_none_or(|p| p.is_within(path) || path.is_within(p)))
        .map(|path| InitiativeStatus {
            path: path.clone(),
            progress: session.progress(Some(path)),
        })
        .collect();

    let report = StatusReport {
        prefix: prefix.cloned(),
        fully_resolved: session.is_fully_resolved(prefix),
        progress: session.progress(prefix),
        initiatives,
    };

    render_mode(
        output,
        &report,
        |report, w| {
            writeln!(
                w,
                "resolved {}/{} accepted {} rejected {}",
                report.progress.resolved,
                report.progress.total,
                report.progress.accepted,
                report.progress.rejected
            )?;
            for row in &report.initiatives {
                writeln!(
                    w,
                    "{}  {}/{}",
                    row.path, row.progress.resolved, row.progress.total
                )?;
            }
            Ok(())
        },
        |report, w| {
            let heading = report
                .prefix
                .as_ref()
                .map_or_else(|| "Review status".to_string(), |p| format!("Review status: {p}"));
            pretty_section(w, &heading)?;
            pretty_kv(
                w,
                "resolved",
                format!("{}/{}", report.progress.resolved, report.progress.total),
            )?;
            pretty_kv(w, "accepted", report.progress.accepted.to_string())?;
            pretty_kv(w, "rejected", report.progress.rejected.to_string())?;
            pretty_kv(
                w,
                "ready",
                if report.fully_resolved { "yes" } else { "no" },
            )?;
            if !report.initiatives.is_empty() {
                pretty_rule(w)?;
                for row in &report.initiatives {
                    let mark = if row.progress.is_complete() { "✓" } else { " " };
                    writeln!(
                        w,
                        "{mark} {:<40} {:>3}/{:<3} unresolved {}",
                        row.path.to_string(),
                        row.progress.resolved,
                        row.progress.total,
                        row.progress.unresolved()
                    )?;
                }
            }
            Ok(())
        },
    )
}
