// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [orchestrator]
/// script = "fedorable.sh"
/// elevation = "pkexec"
///
/// [[task]]
/// key = "update"
/// label = "Update System Packages"
///
/// [[option]]
/// key = "dry_run"
/// label = "Dry Run (No changes made)"
/// flag = "--dry-run"
/// ```
///
/// Entry order in the file is the catalogue order, and therefore the order in
/// which flags are emitted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub orchestrator: RawOrchestratorSection,

    #[serde(default)]
    pub task: Vec<TaskEntry>,

    #[serde(default)]
    pub option: Vec<RawOptionEntry>,
}

/// `[orchestrator]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrchestratorSection {
    /// Path of the maintenance script. Relative paths are resolved against
    /// the directory holding the config file. `None` means "next to the
    /// running executable".
    #[serde(default)]
    pub script: Option<PathBuf>,

    /// Privilege-elevation program placed in front of the script.
    #[serde(default = "default_elevation")]
    pub elevation: String,

    /// Exit codes of the elevation program that mean authorization was
    /// refused rather than the script failing. Empty unless configured: the
    /// usual helpers pass the script's own status through, so any code could
    /// also be a real script exit.
    #[serde(default)]
    pub denial_exit_codes: Vec<i32>,
}

pub(crate) fn default_elevation() -> String {
    "pkexec".to_string()
}

impl Default for RawOrchestratorSection {
    fn default() -> Self {
        Self {
            script: None,
            elevation: default_elevation(),
            denial_exit_codes: Vec::new(),
        }
    }
}

/// `[[task]]` entry. Tasks run unless disabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskEntry {
    pub key: String,

    #[serde(default)]
    pub label: String,

    #[serde(default = "default_task_enabled")]
    pub default: bool,
}

fn default_task_enabled() -> bool {
    true
}

/// `[[option]]` entry as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawOptionEntry {
    pub key: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub default: bool,

    /// Literal flag spelling. Required unless the key starts with
    /// [`PERFORM_PREFIX`].
    #[serde(default)]
    pub flag: Option<String>,
}

/// Options whose key carries this prefix map mechanically to `--<key>`.
pub const PERFORM_PREFIX: &str = "perform_";

/// Validated option entry with its flag spelling resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub key: String,
    pub label: String,
    pub default: bool,
    pub flag: String,
}

/// The ordered task/option catalogue.
///
/// Only constructed through validation (or the built-in defaults), so every
/// key is unique and every option has a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    tasks: Vec<TaskEntry>,
    options: Vec<OptionEntry>,
}

impl Catalogue {
    pub(crate) fn new_unchecked(tasks: Vec<TaskEntry>, options: Vec<OptionEntry>) -> Self {
        Self { tasks, options }
    }

    pub fn tasks(&self) -> &[TaskEntry] {
        &self.tasks
    }

    pub fn options(&self) -> &[OptionEntry] {
        &self.options
    }

    pub fn task(&self, key: &str) -> Option<&TaskEntry> {
        self.tasks.iter().find(|t| t.key == key)
    }

    pub fn option(&self, key: &str) -> Option<&OptionEntry> {
        self.options.iter().find(|o| o.key == key)
    }
}

/// Where the script lives and how it is elevated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub elevation: String,
    /// Always absolute.
    pub script: PathBuf,
    pub denial_exit_codes: Vec<i32>,
}

/// Validated configuration: settings plus catalogue.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub settings: OrchestratorSettings,
    pub catalogue: Catalogue,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(settings: OrchestratorSettings, catalogue: Catalogue) -> Self {
        Self {
            settings,
            catalogue,
        }
    }
}
