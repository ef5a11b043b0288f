// src/exec/supervisor.rs

//! Lifecycle owner for the (at most one) live maintenance process.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::command::CommandSpec;
use crate::engine::{RunEvent, RunId};
use crate::errors::{FedorableError, Result};
use crate::exec::backend::ProcessBackend;
use crate::fs::FileSystem;
use crate::types::ScriptProblem;

/// The live run. Only the supervisor holds it.
struct RunHandle {
    run_id: RunId,
    task: JoinHandle<()>,
}

impl fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunHandle")
            .field("run_id", &self.run_id)
            .field("task_finished", &self.task.is_finished())
            .finish()
    }
}

/// Starts runs through a [`ProcessBackend`] and guarantees that at most one
/// is live at a time. Termination arrives as `RunEvent::Finished` on the
/// event channel handed in at construction; the coordinator then calls
/// [`ProcessSupervisor::release`].
pub struct ProcessSupervisor<B: ProcessBackend> {
    backend: B,
    fs: Arc<dyn FileSystem>,
    events: mpsc::Sender<RunEvent>,
    active: Option<RunHandle>,
    next_run_id: RunId,
}

impl<B: ProcessBackend> fmt::Debug for ProcessSupervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("active", &self.active)
            .field("next_run_id", &self.next_run_id)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> ProcessSupervisor<B> {
    pub fn new(backend: B, fs: Arc<dyn FileSystem>, events: mpsc::Sender<RunEvent>) -> Self {
        Self {
            backend,
            fs,
            events,
            active: None,
            next_run_id: 1,
        }
    }

    /// True between a successful `start` and the matching `release`.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Fails with `ScriptUnavailable` unless `script` is an executable file.
    /// Anything at the path that is not a regular file counts as not found.
    pub fn check_script(&self, script: &Path) -> Result<()> {
        let problem = if !self.fs.exists(script) {
            ScriptProblem::NotFound
        } else if !self.fs.is_file(script) {
            debug!(path = %script.display(), "script path is not a regular file");
            ScriptProblem::NotFound
        } else if !self.fs.is_executable(script) {
            ScriptProblem::NotExecutable
        } else {
            return Ok(());
        };

        Err(FedorableError::ScriptUnavailable {
            path: script.to_path_buf(),
            problem,
        })
    }

    /// Launch `command`.
    ///
    /// Refuses with `AlreadyRunning` while a run is live and with
    /// `ScriptUnavailable` before anything is spawned, so the elevation
    /// prompt never appears for a run that cannot work. Spawn failures are
    /// not errors here; they arrive as a failed verdict.
    pub fn start(&mut self, command: CommandSpec) -> Result<RunId> {
        if let Some(active) = &self.active {
            debug!(run_id = active.run_id, "start refused; a run is already live");
            return Err(FedorableError::AlreadyRunning);
        }

        self.check_script(Path::new(command.script()))?;

        let run_id = self.next_run_id;
        self.next_run_id += 1;

        info!(run_id, "launching maintenance run");
        let task = self.backend.launch(run_id, command, self.events.clone());
        self.active = Some(RunHandle { run_id, task });

        Ok(run_id)
    }

    /// Forget the live run once its `Finished` event has been received.
    /// Returns false if `run_id` is not the live run.
    pub fn release(&mut self, run_id: RunId) -> bool {
        match &self.active {
            Some(handle) if handle.run_id == run_id => {
                self.active = None;
                debug!(run_id, "run released");
                true
            }
            _ => false,
        }
    }
}
