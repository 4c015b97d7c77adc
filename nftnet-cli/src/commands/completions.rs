//! Completions command - Shell completion scripts on stdout

use std::io;

use clap::Command;
use clap_complete::{generate, shells};

/// Shells with completion support
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

/// Write the completion script for `shell` into `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn io::Write) {
    let name = cmd.get_name().to_string();
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, name, out),
        Shell::Zsh => generate(shells::Zsh, cmd, name, out),
        Shell::Fish => generate(shells::Fish, cmd, name, out),
        Shell::PowerShell => generate(shells::PowerShell, cmd, name, out),
    }
}

/// Run the completions command
pub fn run(shell: Shell, cmd: &mut Command) -> anyhow::Result<()> {
    write_completions(shell, cmd, &mut io::stdout());
    Ok(())
}
