#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fedorable::config::{
    ConfigFile, RawConfigFile, RawOptionEntry, RawOrchestratorSection, TaskEntry,
};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                orchestrator: RawOrchestratorSection {
                    script: Some(PathBuf::from("/usr/local/bin/fedorable.sh")),
                    ..RawOrchestratorSection::default()
                },
                task: Vec::new(),
                option: Vec::new(),
            },
        }
    }

    pub fn script(mut self, path: impl AsRef<Path>) -> Self {
        self.config.orchestrator.script = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn elevation(mut self, program: &str) -> Self {
        self.config.orchestrator.elevation = program.to_string();
        self
    }

    pub fn denial_exit_codes(mut self, codes: &[i32]) -> Self {
        self.config.orchestrator.denial_exit_codes = codes.to_vec();
        self
    }

    pub fn task(self, key: &str) -> Self {
        self.task_with_default(key, true)
    }

    pub fn task_with_default(mut self, key: &str, default: bool) -> Self {
        self.config.task.push(TaskEntry {
            key: key.to_string(),
            label: key.to_string(),
            default,
        });
        self
    }

    /// Option mapped by the `perform_` prefix rule or an explicit flag.
    pub fn option(mut self, key: &str, flag: Option<&str>) -> Self {
        self.config.option.push(RawOptionEntry {
            key: key.to_string(),
            label: key.to_string(),
            default: false,
            flag: flag.map(str::to_string),
        });
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
