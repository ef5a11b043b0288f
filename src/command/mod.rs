// src/command/mod.rs

//! Translating a [`ConfigSnapshot`](crate::config::ConfigSnapshot) into the
//! elevated script invocation.
//!
//! - [`builder`] holds the pure snapshot → argument vector translation.
//! - [`CommandSpec`] is the resulting argument vector.

pub mod builder;

use std::fmt;
use std::path::Path;

pub use builder::CommandBuilder;

/// `clean_journal` → `clean-journal`.
pub fn dasherize(key: &str) -> String {
    key.replace('_', "-")
}

/// Fully-resolved invocation: `[elevation, script, flags...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    pub fn new(elevation: impl Into<String>, script: &Path, flags: Vec<String>) -> Self {
        let mut argv = Vec::with_capacity(flags.len() + 2);
        argv.push(elevation.into());
        argv.push(script.to_string_lossy().into_owned());
        argv.extend(flags);
        Self { argv }
    }

    /// The elevation program, i.e. what actually gets executed.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn script(&self) -> &str {
        &self.argv[1]
    }

    pub fn flags(&self) -> &[String] {
        &self.argv[2..]
    }

    /// Everything after the program: the script path, then the flags.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Shell-quoted rendering for echoing to the operator.
    pub fn display(&self) -> String {
        self.argv
            .iter()
            .map(|arg| match shlex::try_quote(arg) {
                Ok(quoted) => quoted.into_owned(),
                // Only fails on interior NUL, which no argv can carry anyway.
                Err(_) => format!("{arg:?}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_paths_with_spaces() {
        let spec = CommandSpec::new(
            "pkexec",
            Path::new("/opt/my scripts/fedorable.sh"),
            vec!["--dry-run".to_string()],
        );
        assert_eq!(spec.display(), "pkexec '/opt/my scripts/fedorable.sh' --dry-run");
        assert_eq!(spec.program(), "pkexec");
        assert_eq!(spec.args().len(), 2);
    }

    #[test]
    fn dasherize_replaces_every_underscore() {
        assert_eq!(dasherize("reset_failed_units"), "reset-failed-units");
        assert_eq!(dasherize("trim"), "trim");
    }
}
