// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The terminal stands in for the checkbox panel: every task starts at its
//! catalogue default and is toggled with the repeatable flags below.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `fedorable`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fedorable",
    version,
    about = "Run the privileged system-maintenance script with a chosen set of tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Catalogue/config file (TOML). Without it the built-in catalogue is used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the maintenance script path.
    #[arg(long, value_name = "PATH")]
    pub script: Option<PathBuf>,

    /// Override the privilege-elevation program (e.g. `pkexec`, `sudo`).
    #[arg(long, value_name = "PROGRAM")]
    pub elevation: Option<String>,

    /// Skip a maintenance task (repeatable), e.g. `--disable-task clean_journal`.
    #[arg(long = "disable-task", value_name = "TASK")]
    pub disable_tasks: Vec<String>,

    /// Run a task whose catalogue default is off (repeatable).
    #[arg(long = "enable-task", value_name = "TASK")]
    pub enable_tasks: Vec<String>,

    /// Turn an option on (repeatable), e.g. `--enable-option dry_run`.
    #[arg(long = "enable-option", value_name = "OPTION")]
    pub enable_options: Vec<String>,

    /// Turn an option off whose catalogue default is on (repeatable).
    #[arg(long = "disable-option", value_name = "OPTION")]
    pub disable_options: Vec<String>,

    /// Print the catalogue and exit.
    #[arg(long)]
    pub list: bool,

    /// Print the command that would be run and exit.
    #[arg(long)]
    pub print_command: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FEDORABLE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeatable_toggles_are_collected() {
        let args = CliArgs::parse_from([
            "fedorable",
            "--disable-task",
            "clean_journal",
            "--disable-task",
            "trim",
            "--enable-option",
            "dry_run",
            "--print-command",
        ]);
        assert_eq!(args.disable_tasks, vec!["clean_journal", "trim"]);
        assert_eq!(args.enable_options, vec!["dry_run"]);
        assert!(args.print_command);
        assert!(args.config.is_none());
    }
}
