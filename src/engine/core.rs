// src/engine/core.rs

//! Pure run state machine.
//!
//! This module contains a synchronous, deterministic state machine that
//! consumes run lifecycle inputs and produces:
//! - an updated state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Orchestrator`) is responsible for
//! reading events from channels, talking to the supervisor and calling the
//! sink and control surface. The core is unit tested without any Tokio,
//! channels, or processes.

use std::collections::BTreeSet;

use tracing::debug;

use crate::engine::{OutputChunk, RunEvent, RunId, RunVerdict};
use crate::errors::{FedorableError, Result};
use crate::types::{OutputSource, VerdictReason};

/// Lifecycle of the single run slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    /// Building the command and checking preconditions; nothing spawned yet.
    Starting,
    Running,
    /// Verdict delivered; waiting for the shell to finish flushing.
    Finalizing,
}

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Disable the configuration-editing surface.
    LockSurface,
    /// Re-enable the configuration-editing surface.
    UnlockSurface,
    /// Hand a chunk to the output sink.
    Append(OutputChunk),
    /// Hand the verdict to the output sink.
    Report(RunVerdict),
}

/// Commands returned by the core after a single input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
}

impl CoreStep {
    fn none() -> Self {
        Self::default()
    }

    fn one(command: CoreCommand) -> Self {
        Self {
            commands: vec![command],
        }
    }
}

/// Pure core state.
///
/// A verdict is only reported once both output streams of the run have
/// closed; one that arrives early is held back until they do. Spawn failures
/// never opened any stream and are reported immediately.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
    active_run: Option<RunId>,
    open_streams: BTreeSet<OutputSource>,
    pending_verdict: Option<RunVerdict>,
    last_verdict: Option<RunVerdict>,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            active_run: None,
            open_streams: BTreeSet::new(),
            pending_verdict: None,
            last_verdict: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Verdict of the most recently finished run.
    pub fn last_verdict(&self) -> Option<&RunVerdict> {
        self.last_verdict.as_ref()
    }

    /// `Idle → Starting`. Anything else is `AlreadyRunning` with no change.
    pub fn begin(&mut self) -> Result<CoreStep> {
        if self.state != RunState::Idle {
            debug!(state = ?self.state, "run request refused");
            return Err(FedorableError::AlreadyRunning);
        }
        self.state = RunState::Starting;
        Ok(CoreStep::one(CoreCommand::LockSurface))
    }

    /// `Starting → Idle` after a precondition failure.
    pub fn abort_start(&mut self) -> CoreStep {
        if self.state != RunState::Starting {
            return CoreStep::none();
        }
        self.state = RunState::Idle;
        CoreStep::one(CoreCommand::UnlockSurface)
    }

    /// `Starting → Running` once the supervisor accepted the run.
    pub fn mark_running(&mut self, run_id: RunId) -> CoreStep {
        if self.state != RunState::Starting {
            return CoreStep::none();
        }
        self.state = RunState::Running;
        self.active_run = Some(run_id);
        self.open_streams = OutputSource::ALL.into_iter().collect();
        self.pending_verdict = None;
        // Surface was locked on entering Starting and stays locked.
        CoreStep::none()
    }

    /// Feed one event from the readers or the exit watcher.
    pub fn step(&mut self, event: RunEvent) -> CoreStep {
        if self.state != RunState::Running || self.active_run != Some(event.run_id()) {
            debug!(state = ?self.state, run_id = event.run_id(), "ignoring stale run event");
            return CoreStep::none();
        }

        match event {
            RunEvent::Chunk { chunk, .. } => CoreStep::one(CoreCommand::Append(chunk)),
            RunEvent::StreamClosed { source, .. } => {
                self.open_streams.remove(&source);
                if self.open_streams.is_empty() {
                    if let Some(verdict) = self.pending_verdict.take() {
                        return self.report(verdict);
                    }
                }
                CoreStep::none()
            }
            RunEvent::Finished { verdict, .. } => {
                let never_opened = verdict.reason == VerdictReason::SpawnFailed
                    && self.open_streams.len() == OutputSource::ALL.len();
                if self.open_streams.is_empty() || never_opened {
                    self.report(verdict)
                } else {
                    debug!(open = ?self.open_streams, "verdict held until streams close");
                    self.pending_verdict = Some(verdict);
                    CoreStep::none()
                }
            }
        }
    }

    /// `Finalizing → Idle`, once the shell has flushed the verdict.
    pub fn finish(&mut self) -> CoreStep {
        if self.state != RunState::Finalizing {
            return CoreStep::none();
        }
        self.state = RunState::Idle;
        self.active_run = None;
        CoreStep::one(CoreCommand::UnlockSurface)
    }

    fn report(&mut self, verdict: RunVerdict) -> CoreStep {
        self.state = RunState::Finalizing;
        self.open_streams.clear();
        self.last_verdict = Some(verdict.clone());
        CoreStep::one(CoreCommand::Report(verdict))
    }
}
