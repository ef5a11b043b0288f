// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the elevated maintenance
//! script, using `tokio::process::Command`, and reporting back to the
//! orchestrator via [`RunEvent`](crate::engine::RunEvent)s.
//!
//! - [`supervisor`] owns the single live run and its preconditions.
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `TokioProcessBackend`; tests replace it with a fake.
//! - [`run`] drives one child process: two stream readers plus the exit
//!   watcher, then the verdict.
//! - [`stream`] is the incremental reader for one output channel.

pub mod backend;
pub mod run;
pub mod stream;
pub mod supervisor;

pub use backend::{ProcessBackend, TokioProcessBackend};
pub use stream::StreamReader;
pub use supervisor::ProcessSupervisor;
