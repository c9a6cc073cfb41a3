#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, fail};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use verdict_core::ErrorCode;
use verdict_core::config::{EffectiveConfig, resolve_config};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "verdict: review AI-proposed initiative and task changes",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format; overrides `--json`, `FORMAT` and user config.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Output mode from flags alone, used before config is available.
    const fn flag_output_mode(&self) -> Option<OutputMode> {
        match self.format {
            Some(mode) => Some(mode),
            None if self.json => Some(OutputMode::Json),
            None => None,
        }
    }

    /// Output mode after config resolution.
    fn output_mode(&self, config: &EffectiveConfig) -> OutputMode {
        self.flag_output_mode()
            .or_else(|| OutputMode::from_name(&config.resolved_output))
            .unwrap_or(OutputMode::Text)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Review",
        about = "List normalized suggestions",
        long_about = "Normalize a bundle of improvements against current initiatives and tasks and list the resulting suggestions in review order.",
        after_help = "EXAMPLES:\n    # List every suggestion\n    vd suggestions bundle.json\n\n    # Only entity-level suggestions, as JSON\n    vd suggestions bundle.json --entities --json"
    )]
    Suggestions(cmd::suggestions::SuggestionsArgs),

    #[command(
        next_help_heading = "Review",
        about = "Show resolution progress",
        long_about = "Replay a decisions file onto a bundle and report how many suggestions are resolved, overall and per initiative.",
        after_help = "EXAMPLES:\n    # Progress after replaying decisions\n    vd status bundle.json --decisions decisions.json\n\n    # Progress within one initiative\n    vd status bundle.json --decisions decisions.json --prefix initiative.INIT-1"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Review",
        about = "Emit accepted changes",
        long_about = "Replay a decisions file onto a bundle and emit the accepted initiative and task changes, subject to the project's review gates in .verdict/config.toml.",
        after_help = "EXAMPLES:\n    # Accepted changes as JSON\n    vd accept bundle.json --decisions decisions.json --json"
    )]
    Accept(cmd::accept::AcceptArgs),

    #[command(
        next_help_heading = "Setup",
        about = "Generate shell completions",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    vd completions bash\n\n    # Generate zsh completions\n    vd completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("VERDICT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "verdict=debug,info"
        } else {
            "verdict=info,warn"
        })
    });

    let format = env::var("VERDICT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let config = resolve_config(&project_root, cli.json).map_err(|e| {
        fail(
            cli.flag_output_mode().unwrap_or(OutputMode::Text),
            &CliError::coded(format!("{e:#}"), ErrorCode::ConfigParseError),
        )
    })?;
    let output = cli.output_mode(&config);
    debug!(?output, "resolved output mode");

    match cli.command {
        Commands::Suggestions(ref args) => cmd::suggestions::run_suggestions(args, output),
        Commands::Status(ref args) => cmd::status::run_status(args, output),
        Commands::Accept(ref args) => {
            cmd::accept::run_accept(args, &config.project.review, output)
        }
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
