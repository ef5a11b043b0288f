// src/engine/sink.rs

//! Collaborators owned by the presentation layer.
//!
//! The orchestrator only ever calls these from its coordinating context, one
//! call at a time, so implementations need no internal synchronization.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::engine::{ChunkKind, OutputChunk, RunVerdict};
use crate::types::OutputSource;

/// Receives the run's output and verdict, in delivery order.
pub trait OutputSink: Send {
    /// A run was accepted; called before its first chunk.
    fn begin_run(&mut self, command: &CommandSpec);

    fn append(&mut self, chunk: &OutputChunk);

    /// Called exactly once per accepted run, after its last chunk.
    fn finish(&mut self, verdict: &RunVerdict);
}

/// The configuration-editing surface. Both calls must be idempotent.
pub trait ControlSurface: Send {
    fn lock(&mut self);
    fn unlock(&mut self);
}

/// Terminal rendition of the output pane.
///
/// Stdout chunks go to `out`, stderr chunks and stream-error markers go to
/// `err`. Banners mirror the source of the verdict.
#[derive(Debug)]
pub struct ConsoleSink<O: Write + Send, E: Write + Send> {
    out: O,
    err: E,
}

impl ConsoleSink<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write + Send, E: Write + Send> ConsoleSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write(&mut self, to_err: bool, text: &str) {
        let res = if to_err {
            self.err.write_all(text.as_bytes()).and_then(|_| self.err.flush())
        } else {
            self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush())
        };
        if let Err(e) = res {
            warn!(error = %e, "failed to write maintenance output to terminal");
        }
    }
}

impl<O: Write + Send, E: Write + Send> OutputSink for ConsoleSink<O, E> {
    fn begin_run(&mut self, command: &CommandSpec) {
        self.write(false, &format!("Running command: {}\n\n", command.display()));
    }

    fn append(&mut self, chunk: &OutputChunk) {
        let to_err = chunk.source == OutputSource::Stderr || chunk.kind == ChunkKind::StreamError;
        self.write(to_err, &chunk.text);
    }

    fn finish(&mut self, verdict: &RunVerdict) {
        if verdict.succeeded {
            self.write(false, "\n--- Maintenance Finished Successfully ---\n");
        } else {
            self.write(
                true,
                &format!("\n--- Maintenance Failed (Exit Code: {}) ---\n", verdict.exit_code),
            );
        }
        info!(status = %verdict.status_message(), "run finished");
    }
}

/// Control surface for front-ends without editable controls: records the
/// lock state and logs transitions.
#[derive(Debug, Default)]
pub struct LoggingSurface {
    locked: bool,
}

impl LoggingSurface {
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl ControlSurface for LoggingSurface {
    fn lock(&mut self) {
        if !self.locked {
            self.locked = true;
            debug!("configuration surface locked");
        }
    }

    fn unlock(&mut self) {
        if self.locked {
            self.locked = false;
            debug!("configuration surface unlocked");
        }
    }
}
