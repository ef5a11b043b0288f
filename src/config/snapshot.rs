// src/config/snapshot.rs

//! Immutable capture of the operator's selection for one run.

use std::collections::BTreeMap;

use crate::config::model::Catalogue;
use crate::errors::{FedorableError, Result};

/// Task and option switches as they were when the run was requested.
///
/// A snapshot is handed to the orchestrator by value, so later edits in the
/// presentation layer cannot leak into a run that is already in flight.
/// Completeness against the catalogue is checked by the command builder, not
/// here, so that a hand-built snapshot with missing keys fails loudly there.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfigSnapshot {
    tasks: BTreeMap<String, bool>,
    options: BTreeMap<String, bool>,
}

impl ConfigSnapshot {
    pub fn new(tasks: BTreeMap<String, bool>, options: BTreeMap<String, bool>) -> Self {
        Self { tasks, options }
    }

    /// Every catalogue entry at its default state.
    pub fn defaults(catalogue: &Catalogue) -> Self {
        let tasks = catalogue
            .tasks()
            .iter()
            .map(|t| (t.key.clone(), t.default))
            .collect();
        let options = catalogue
            .options()
            .iter()
            .map(|o| (o.key.clone(), o.default))
            .collect();
        Self { tasks, options }
    }

    pub fn with_task(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.tasks.insert(key.into(), enabled);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.options.insert(key.into(), enabled);
        self
    }

    pub fn task(&self, key: &str) -> Option<bool> {
        self.tasks.get(key).copied()
    }

    pub fn option(&self, key: &str) -> Option<bool> {
        self.options.get(key).copied()
    }

    pub fn tasks(&self) -> &BTreeMap<String, bool> {
        &self.tasks
    }

    pub fn options(&self) -> &BTreeMap<String, bool> {
        &self.options
    }
}

impl Catalogue {
    /// Reject a task key the catalogue does not know, for early feedback in
    /// a presentation layer.
    pub fn check_task_key(&self, key: &str) -> Result<()> {
        if self.task(key).is_none() {
            return Err(FedorableError::InvalidConfiguration(format!(
                "unknown task '{key}'"
            )));
        }
        Ok(())
    }

    pub fn check_option_key(&self, key: &str) -> Result<()> {
        if self.option(key).is_none() {
            return Err(FedorableError::InvalidConfiguration(format!(
                "unknown option '{key}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::builtin_catalogue;

    #[test]
    fn defaults_cover_whole_catalogue() {
        let cat = builtin_catalogue();
        let snap = ConfigSnapshot::defaults(&cat);

        assert_eq!(snap.tasks().len(), cat.tasks().len());
        assert_eq!(snap.options().len(), cat.options().len());
        assert_eq!(snap.task("clean_journal"), Some(true));
        assert_eq!(snap.option("dry_run"), Some(false));
    }

    #[test]
    fn with_task_returns_modified_copy() {
        let cat = builtin_catalogue();
        let base = ConfigSnapshot::defaults(&cat);
        let changed = base.clone().with_task("trim", false);

        assert_eq!(base.task("trim"), Some(true));
        assert_eq!(changed.task("trim"), Some(false));
    }

    #[test]
    fn unknown_keys_are_flagged_by_catalogue() {
        let cat = builtin_catalogue();
        assert!(cat.check_task_key("update").is_ok());
        assert!(cat.check_task_key("defrag").is_err());
        assert!(cat.check_option_key("yes").is_ok());
        assert!(cat.check_option_key("update").is_err());
    }
}
