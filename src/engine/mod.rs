// src/engine/mod.rs

//! Run orchestration engine.
//!
//! This module ties together:
//! - the run state machine (Idle → Starting → Running → Finalizing → Idle)
//! - the process supervisor and its stream readers
//! - the output sink and control surface owned by the presentation layer
//!
//! The pure state machine lives in [`core`]; the async/IO shell that owns the
//! sink and serializes every delivery is [`runtime`].

use std::fmt;

use crate::types::{OutputSource, VerdictReason};

/// Exit code reported when no real exit code exists.
pub const SENTINEL_EXIT_CODE: i32 = -1;

/// Identifies one run attempt; increases monotonically per supervisor.
pub type RunId = u64;

/// Whether a chunk carries script output or reports a broken channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Data,
    StreamError,
}

/// One incrementally delivered piece of script output.
///
/// `sequence_no` counts per source from zero. Concatenating the `Data`
/// chunks of one source in order reproduces that channel byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub source: OutputSource,
    pub kind: ChunkKind,
    pub text: String,
    pub sequence_no: u64,
}

impl OutputChunk {
    pub fn is_data(&self) -> bool {
        self.kind == ChunkKind::Data
    }
}

/// Final report for one run attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunVerdict {
    pub succeeded: bool,
    pub exit_code: i32,
    pub reason: VerdictReason,
    /// Why the run could not start, when known.
    pub detail: Option<String>,
}

impl RunVerdict {
    pub fn exited(exit_code: i32) -> Self {
        Self {
            succeeded: exit_code == 0,
            exit_code,
            reason: VerdictReason::NormalExit,
            detail: None,
        }
    }

    pub fn signaled() -> Self {
        Self {
            succeeded: false,
            exit_code: SENTINEL_EXIT_CODE,
            reason: VerdictReason::Signaled,
            detail: None,
        }
    }

    pub fn spawn_failed(exit_code: i32) -> Self {
        Self {
            succeeded: false,
            exit_code,
            reason: VerdictReason::SpawnFailed,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// One-line status for a status bar or terminal.
    pub fn status_message(&self) -> String {
        match (self.succeeded, self.reason) {
            (true, _) => "Maintenance finished successfully.".to_string(),
            (false, VerdictReason::NormalExit) => format!(
                "Maintenance failed (Exit Code: {}). Check output.",
                self.exit_code
            ),
            (false, VerdictReason::Signaled) => {
                "Maintenance terminated by a signal. Check output.".to_string()
            }
            (false, VerdictReason::SpawnFailed) => match &self.detail {
                Some(detail) => format!(
                    "Maintenance could not be started (Exit Code: {}): {detail}.",
                    self.exit_code
                ),
                None => format!(
                    "Maintenance could not be started (Exit Code: {}).",
                    self.exit_code
                ),
            },
        }
    }
}

impl fmt::Display for RunVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status_message())
    }
}

/// Events flowing from readers and the exit watcher into the coordinating
/// context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A reader produced a chunk.
    Chunk { run_id: RunId, chunk: OutputChunk },
    /// A reader hit end-of-stream (or gave up after a stream error).
    StreamClosed { run_id: RunId, source: OutputSource },
    /// The process is gone and both readers have finished.
    Finished { run_id: RunId, verdict: RunVerdict },
}

impl RunEvent {
    pub fn run_id(&self) -> RunId {
        match self {
            RunEvent::Chunk { run_id, .. }
            | RunEvent::StreamClosed { run_id, .. }
            | RunEvent::Finished { run_id, .. } => *run_id,
        }
    }
}

pub mod core;
pub mod runtime;
pub mod sink;

pub use core::{CoreCommand, CoreStep, RunState, RunStateMachine};
pub use runtime::{Orchestrator, RunRequest};
pub use sink::{ConsoleSink, ControlSurface, LoggingSurface, OutputSink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages_follow_reason() {
        assert_eq!(
            RunVerdict::exited(0).status_message(),
            "Maintenance finished successfully."
        );
        assert_eq!(
            RunVerdict::exited(3).status_message(),
            "Maintenance failed (Exit Code: 3). Check output."
        );
        assert!(!RunVerdict::signaled().succeeded);
        assert_eq!(RunVerdict::spawn_failed(SENTINEL_EXIT_CODE).exit_code, -1);
    }
}
