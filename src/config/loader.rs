// src/config/loader.rs

use std::path::{Path, PathBuf};

use crate::config::defaults::builtin_config;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization plus resolving a relative
/// `script` path against the file's directory; it does **not** validate the
/// catalogue. Use [`load_and_validate`] for that.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;

    if let Some(script) = config.orchestrator.script.take() {
        config.orchestrator.script = Some(resolve_relative(path, script));
    }

    Ok(config)
}

/// Load a configuration file from disk and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks key syntax, duplicates and option flag mapping.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    load_and_validate_with(&RealFileSystem, path)
}

pub fn load_and_validate_with(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, &path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load `path` if given, otherwise fall back to the built-in catalogue.
pub fn load_or_default(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(path) => load_and_validate(path),
        None => Ok(builtin_config()),
    }
}

fn resolve_relative(config_path: &Path, script: PathBuf) -> PathBuf {
    if script.is_absolute() {
        return script;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(script),
        _ => script,
    }
}
