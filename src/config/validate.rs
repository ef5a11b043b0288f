// src/config/validate.rs

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::defaults::default_script_path;
use crate::config::model::{
    Catalogue, ConfigFile, OptionEntry, OrchestratorSettings, RawConfigFile, RawOptionEntry,
    RawOrchestratorSection, TaskEntry, PERFORM_PREFIX,
};
use crate::errors::{FedorableError, Result};

static KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex"));

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FedorableError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let settings = validate_orchestrator(raw.orchestrator)?;
        let catalogue = validate_catalogue(raw.task, raw.option)?;
        Ok(ConfigFile::new_unchecked(settings, catalogue))
    }
}

fn invalid(msg: impl Into<String>) -> FedorableError {
    FedorableError::InvalidConfiguration(msg.into())
}

fn validate_orchestrator(raw: RawOrchestratorSection) -> Result<OrchestratorSettings> {
    if raw.elevation.trim().is_empty() {
        return Err(invalid("[orchestrator].elevation must not be empty"));
    }

    let script = match raw.script {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(invalid("[orchestrator].script must not be empty"));
        }
        Some(path) => absolute_script_path(path)?,
        None => default_script_path(),
    };

    Ok(OrchestratorSettings {
        elevation: raw.elevation,
        script,
        denial_exit_codes: raw.denial_exit_codes,
    })
}

fn absolute_script_path(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::path::absolute(&path)?)
}

/// Validate and resolve the catalogue: keys well-formed and unique, every
/// option mapped to a flag.
pub fn validate_catalogue(tasks: Vec<TaskEntry>, options: Vec<RawOptionEntry>) -> Result<Catalogue> {
    if tasks.is_empty() {
        return Err(invalid("catalogue must contain at least one [[task]] entry"));
    }

    let mut seen = HashSet::new();
    for task in &tasks {
        validate_key("task", &task.key)?;
        if !seen.insert(task.key.as_str()) {
            return Err(invalid(format!("duplicate task key '{}'", task.key)));
        }
    }

    let mut seen = HashSet::new();
    for option in &options {
        validate_key("option", &option.key)?;
        if !seen.insert(option.key.as_str()) {
            return Err(invalid(format!("duplicate option key '{}'", option.key)));
        }
    }

    let options = options
        .into_iter()
        .map(resolve_option)
        .collect::<Result<Vec<_>>>()?;

    Ok(Catalogue::new_unchecked(tasks, options))
}

fn validate_key(kind: &str, key: &str) -> Result<()> {
    if !KEY_RE.is_match(key) {
        return Err(invalid(format!(
            "{kind} key '{key}' must match {} (lowercase, digits, underscores)",
            KEY_RE.as_str()
        )));
    }
    Ok(())
}

/// Explicit `flag` wins; otherwise only `perform_*` keys have a mechanical
/// spelling. Anything else would be dead configuration, so it is rejected.
fn resolve_option(raw: RawOptionEntry) -> Result<OptionEntry> {
    let flag = match raw.flag {
        Some(flag) => {
            if !flag.starts_with("--") || flag.len() <= 2 || flag.contains(char::is_whitespace) {
                return Err(invalid(format!(
                    "option '{}' has malformed flag '{}' (expected --<name>)",
                    raw.key, flag
                )));
            }
            flag
        }
        None if raw.key.starts_with(PERFORM_PREFIX) => {
            format!("--{}", crate::command::dasherize(&raw.key))
        }
        None => {
            return Err(invalid(format!(
                "option '{}' has no `flag` and does not start with '{PERFORM_PREFIX}'; \
                 it would never reach the script",
                raw.key
            )));
        }
    };

    Ok(OptionEntry {
        key: raw.key,
        label: raw.label,
        default: raw.default,
        flag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(key: &str) -> TaskEntry {
        TaskEntry {
            key: key.to_string(),
            label: String::new(),
            default: true,
        }
    }

    fn option(key: &str, flag: Option<&str>) -> RawOptionEntry {
        RawOptionEntry {
            key: key.to_string(),
            label: String::new(),
            default: false,
            flag: flag.map(str::to_string),
        }
    }

    #[test]
    fn perform_prefix_resolves_mechanically() {
        let cat = validate_catalogue(
            vec![task("update")],
            vec![option("perform_backup", None), option("yes", Some("--yes"))],
        )
        .unwrap();

        assert_eq!(cat.option("perform_backup").unwrap().flag, "--perform-backup");
        assert_eq!(cat.option("yes").unwrap().flag, "--yes");
    }

    #[test]
    fn unmapped_option_is_rejected() {
        let err = validate_catalogue(vec![task("update")], vec![option("verbose", None)])
            .unwrap_err();
        match err {
            FedorableError::InvalidConfiguration(msg) => assert!(msg.contains("verbose")),
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_and_malformed_keys_are_rejected() {
        assert!(validate_catalogue(vec![task("a"), task("a")], vec![]).is_err());
        assert!(validate_catalogue(vec![task("Clean-Journal")], vec![]).is_err());
        assert!(validate_catalogue(vec![], vec![]).is_err());
        assert!(validate_catalogue(vec![task("a")], vec![option("x", Some("-x"))]).is_err());
    }
}
