// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervisor talks to a `ProcessBackend` instead of spawning processes
//! itself. Production uses [`TokioProcessBackend`]; tests can provide a
//! backend that replays scripted output and verdicts without any process.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::command::CommandSpec;
use crate::engine::{RunEvent, RunId};

use super::run::{drive_run, ExitPolicy};

/// Trait abstracting how a run is launched.
///
/// `launch` must not block. Everything about the run, including a failure to
/// spawn, is reported through `events`; the final event for `run_id` is
/// always `RunEvent::Finished`.
pub trait ProcessBackend: Send {
    fn launch(
        &mut self,
        run_id: RunId,
        command: CommandSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> JoinHandle<()>;
}

/// Real backend used in production: spawns the command with piped output.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessBackend {
    policy: ExitPolicy,
}

impl TokioProcessBackend {
    pub fn new(denial_exit_codes: Vec<i32>) -> Self {
        Self {
            policy: ExitPolicy { denial_exit_codes },
        }
    }
}

impl ProcessBackend for TokioProcessBackend {
    fn launch(
        &mut self,
        run_id: RunId,
        command: CommandSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> JoinHandle<()> {
        let policy = self.policy.clone();
        tokio::spawn(drive_run(run_id, command, policy, events))
    }
}
