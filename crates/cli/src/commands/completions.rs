//! completions command - Shell completion scripts

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

/// Arguments for the completions command
#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Print the completion script for the requested shell
pub fn execute(args: CompletionsArgs) -> ExitCode {
    write_completions(args.shell, &mut std::io::stdout());
    ExitCode::Success
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_per_shell() {
        let cases = [
            (Shell::Bash, "complete"),
            (Shell::Zsh, "compdef"),
            (Shell::Fish, "complete"),
            (Shell::PowerShell, "Register-ArgumentCompleter"),
        ];

        for (shell, marker) in cases {
            let mut buf = Vec::new();
            write_completions(shell, &mut buf);
            let script = String::from_utf8(buf).unwrap();
            assert!(script.contains("spaces"), "{shell}");
            assert!(script.contains(marker), "{shell}");
            assert!(script.contains("download"), "{shell}");
        }
    }
}
