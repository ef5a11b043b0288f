// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ScriptProblem;

#[derive(Error, Debug)]
pub enum FedorableError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Maintenance script unavailable ({problem}): {}", path.display())]
    ScriptUnavailable { path: PathBuf, problem: ScriptProblem },

    #[error("Maintenance is already running")]
    AlreadyRunning,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FedorableError {
    /// Precondition failures are resolved before a run commits to `Running`
    /// and should be shown to the operator as a blocking notification.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            FedorableError::InvalidConfiguration(_) | FedorableError::ScriptUnavailable { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, FedorableError>;
