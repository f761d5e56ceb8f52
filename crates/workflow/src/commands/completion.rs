//! `workflow completion <shell>`.

use std::io::{self, Write};

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::{Cli, CompletionArgs};

/// Execute the `workflow completion` command.
pub fn run(args: &CompletionArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout().lock());
    Ok(())
}

/// Write the completion script for `shell`, covering every subcommand and
/// flag of the CLI definition.
fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut out = Vec::new();
        write_completions(shell, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn bash_script_knows_repo_flags() {
        let bash = script(Shell::Bash);
        assert!(bash.contains("workflow"));
        assert!(bash.contains("--clear-ignore"));
        assert!(bash.contains("--branch-prefix"));
    }

    #[test]
    fn zsh_script_declares_compdef() {
        assert!(script(Shell::Zsh).starts_with("#compdef workflow"));
    }
}
