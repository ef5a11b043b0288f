// src/config/mod.rs

//! Catalogue and orchestrator configuration.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Provide the built-in catalogue used when no file is given (`defaults.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate catalogue invariants (`validate.rs`).
//! - Capture the operator's selection for one run (`snapshot.rs`).

pub mod defaults;
pub mod loader;
pub mod model;
pub mod snapshot;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    Catalogue, ConfigFile, OptionEntry, OrchestratorSettings, RawConfigFile, RawOptionEntry,
    RawOrchestratorSection, TaskEntry,
};
pub use snapshot::ConfigSnapshot;
