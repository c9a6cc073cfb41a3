//! `vd suggestions <bundle>`: list normalized suggestions.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use verdict_core::suggest::{
    EntityAction, OriginalValue, Suggestion, SuggestionDetail, resolve_original,
};

use crate::output::{OutputMode, clip, pretty_kv, pretty_rule, pretty_section, render_mode};

const VALUE_WIDTH: usize = 48;

/// Arguments for `vd suggestions`.
#[derive(Args, Debug)]
pub struct SuggestionsArgs {
    /// Bundle JSON with improvements and current initiatives/tasks.
    pub bundle: PathBuf,

    /// Only show entity-level suggestions.
    #[arg(long, conflicts_with = "fields")]
    pub entities: bool,

    /// Only show field-level suggestions.
    #[arg(long)]
    pub fields: bool,
}

#[derive(Debug, Serialize)]
struct SuggestionList<'a> {
    total: usize,
    suggestions: Vec<&'a Suggestion>,
}

/// Execute `vd suggestions`.
pub fn run_suggestions(args: &SuggestionsArgs, output: OutputMode) -> anyhow::Result<()> {
    let session = super::open_session(&args.bundle, None, output)?;
    let suggestions: Vec<&Suggestion> = if args.entities {
        session.entity_suggestions().collect()
    } else if args.fields {
        session.field_suggestions().collect()
    } else {
        session.suggestions().iter().collect()
    };

    let list = SuggestionList {
        total: suggestions.len(),
        suggestions,
    };
    let snapshots = session.snapshots();

    render_mode(
        output,
        &list,
        |list, w| {
            for s in &list.suggestions {
                writeln!(w, "{}  {}  {}", s.path, kind_label(s), clip(&suggested(s), VALUE_WIDTH))?;
            }
            Ok(())
        },
        |list, w| {
            pretty_section(w, &format!("Suggestions ({})", list.total))?;
            for s in &list.suggestions {
                render_pretty(s, resolve_original(s, snapshots).as_ref(), w)?;
            }
            Ok(())
        },
    )
}

/// `UPDATE initiative`, `title`, ...
fn kind_label(suggestion: &Suggestion) -> String {
    match &suggestion.detail {
        SuggestionDetail::Entity(entity) => {
            format!("{} {}", entity.action, entity.suggested_value.kind_name())
        }
        SuggestionDetail::Field(field) => field.field_name.to_string(),
    }
}

fn suggested(suggestion: &Suggestion) -> String {
    match &suggestion.detail {
        SuggestionDetail::Entity(entity) => describe_entity(&entity.suggested_value),
        SuggestionDetail::Field(field) => field.suggested_value.clone(),
    }
}

fn describe_entity(action: &EntityAction) -> String {
    let (identifier, nested) = match action {
        EntityAction::Initiative(i) => (i.identifier(), i.tasks().len()),
        EntityAction::Task(t) => (t.identifier(), 0),
    };
    let mut out = identifier.unwrap_or("(new)").to_string();
    if nested > 0 {
        out.push_str(&format!(" +{nested} task change(s)"));
    }
    out
}

fn describe_original(original: Option<&OriginalValue>) -> String {
    match original {
        None => "-".to_string(),
        Some(OriginalValue::Text(text)) => clip(text, VALUE_WIDTH),
        Some(OriginalValue::Entity(_)) => "(current snapshot)".to_string(),
    }
}

fn render_pretty(
    suggestion: &Suggestion,
    original: Option<&OriginalValue>,
    w: &mut dyn Write,
) -> io::Result<()> {
    let indent = if suggestion.path.task_key().is_some() { "  " } else { "" };
    writeln!(w, "{indent}{}", suggestion.path)?;
    pretty_kv(w, &format!("{indent}kind"), kind_label(suggestion))?;
    pretty_kv(
        w,
        &format!("{indent}suggested"),
        clip(&suggested(suggestion), VALUE_WIDTH),
    )?;
    pretty_kv(w, &format!("{indent}original"), describe_original(original))?;
    pretty_rule(w)
}
