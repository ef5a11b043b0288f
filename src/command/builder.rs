// src/command/builder.rs

//! Pure snapshot → argument vector translation.
//!
//! Flag layout, in this order:
//! 1. elevation program, script path;
//! 2. `--no-<task>` for every *disabled* task, in catalogue order
//!    (tasks run by default, so enabled tasks emit nothing);
//! 3. the flag of every *enabled* option, in catalogue order.

use std::path::PathBuf;

use tracing::trace;

use crate::command::{dasherize, CommandSpec};
use crate::config::{Catalogue, ConfigSnapshot, OrchestratorSettings};
use crate::errors::{FedorableError, Result};

/// Builds [`CommandSpec`]s for one catalogue and one script location.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    elevation: String,
    script: PathBuf,
    catalogue: Catalogue,
}

impl CommandBuilder {
    pub fn new(settings: &OrchestratorSettings, catalogue: &Catalogue) -> Self {
        Self {
            elevation: settings.elevation.clone(),
            script: settings.script.clone(),
            catalogue: catalogue.clone(),
        }
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Translate `snapshot` into the invocation.
    ///
    /// Deterministic and side-effect free. Fails with
    /// [`FedorableError::InvalidConfiguration`] if the snapshot does not cover
    /// exactly the catalogue's keys.
    pub fn build(&self, snapshot: &ConfigSnapshot) -> Result<CommandSpec> {
        self.check_coverage(snapshot)?;

        let mut flags = Vec::new();

        for task in self.catalogue.tasks() {
            if snapshot.task(&task.key) == Some(false) {
                flags.push(format!("--no-{}", dasherize(&task.key)));
            }
        }

        for option in self.catalogue.options() {
            if snapshot.option(&option.key) == Some(true) {
                flags.push(option.flag.clone());
            }
        }

        trace!(?flags, "built maintenance flags");
        Ok(CommandSpec::new(self.elevation.clone(), &self.script, flags))
    }

    fn check_coverage(&self, snapshot: &ConfigSnapshot) -> Result<()> {
        let mut problems = Vec::new();

        for task in self.catalogue.tasks() {
            if snapshot.task(&task.key).is_none() {
                problems.push(format!("missing task '{}'", task.key));
            }
        }
        for key in snapshot.tasks().keys() {
            if self.catalogue.task(key).is_none() {
                problems.push(format!("unknown task '{key}'"));
            }
        }
        for option in self.catalogue.options() {
            if snapshot.option(&option.key).is_none() {
                problems.push(format!("missing option '{}'", option.key));
            }
        }
        for key in snapshot.options().keys() {
            if self.catalogue.option(key).is_none() {
                problems.push(format!("unknown option '{key}'"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(FedorableError::InvalidConfiguration(format!(
                "snapshot does not match catalogue: {}",
                problems.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::builtin_catalogue;

    fn builder() -> CommandBuilder {
        let settings = OrchestratorSettings {
            elevation: "pkexec".to_string(),
            script: PathBuf::from("/usr/local/bin/fedorable.sh"),
            denial_exit_codes: vec![],
        };
        CommandBuilder::new(&settings, &builtin_catalogue())
    }

    #[test]
    fn defaults_emit_no_flags() {
        let b = builder();
        let spec = b.build(&ConfigSnapshot::defaults(b.catalogue())).unwrap();
        assert_eq!(spec.argv(), ["pkexec", "/usr/local/bin/fedorable.sh"]);
    }

    #[test]
    fn disabled_task_emits_negated_flag() {
        let b = builder();
        let snap = ConfigSnapshot::defaults(b.catalogue()).with_task("clean_journal", false);
        let spec = b.build(&snap).unwrap();
        assert_eq!(
            spec.argv(),
            ["pkexec", "/usr/local/bin/fedorable.sh", "--no-clean-journal"]
        );
    }

    #[test]
    fn tasks_precede_options_in_catalogue_order() {
        let b = builder();
        let snap = ConfigSnapshot::defaults(b.catalogue())
            .with_option("check_only", true)
            .with_option("perform_backup", true)
            .with_task("update_mandb", false)
            .with_task("update", false);
        let spec = b.build(&snap).unwrap();
        assert_eq!(
            spec.flags(),
            ["--no-update", "--no-update-mandb", "--perform-backup", "--check-only"]
        );
    }

    #[test]
    fn missing_and_unknown_keys_fail_fast() {
        let b = builder();
        let mut tasks = ConfigSnapshot::defaults(b.catalogue()).tasks().clone();
        tasks.remove("trim");
        let options = ConfigSnapshot::defaults(b.catalogue()).options().clone();
        let snap = ConfigSnapshot::new(tasks, options).with_option("turbo", true);

        match b.build(&snap) {
            Err(FedorableError::InvalidConfiguration(msg)) => {
                assert!(msg.contains("missing task 'trim'"));
                assert!(msg.contains("unknown option 'turbo'"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }
}
