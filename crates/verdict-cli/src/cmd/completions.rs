use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `vd completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the command signature uniform.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let name = command.get_name().to_string();
    generate(shell, command, name, &mut std::io::stdout());
    Ok(())
}
