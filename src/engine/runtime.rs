// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::command::CommandBuilder;
use crate::config::ConfigSnapshot;
use crate::errors::Result;
use crate::exec::{ProcessBackend, ProcessSupervisor};
use crate::fs::FileSystem;

use super::core::{CoreCommand, CoreStep, RunState, RunStateMachine};
use super::sink::{ControlSurface, OutputSink};
use super::{RunEvent, RunId, RunVerdict};

/// Capacity of the reader/exit-watcher → coordinator channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A run request from the presentation layer, answered once the run has
/// either been accepted or refused.
#[derive(Debug)]
pub struct RunRequest {
    pub snapshot: ConfigSnapshot,
    pub reply: oneshot::Sender<Result<RunId>>,
}

impl RunRequest {
    pub fn new(snapshot: ConfigSnapshot) -> (Self, oneshot::Receiver<Result<RunId>>) {
        let (reply, rx) = oneshot::channel();
        (Self { snapshot, reply }, rx)
    }
}

/// The coordinating context.
///
/// Owns the state machine, the supervisor, the sink and the control
/// surface. Readers and the exit watcher only ever talk to it through the
/// event channel, so the sink sees one call at a time, in channel order.
pub struct Orchestrator<B, S, C>
where
    B: ProcessBackend,
    S: OutputSink,
    C: ControlSurface,
{
    core: RunStateMachine,
    builder: CommandBuilder,
    supervisor: ProcessSupervisor<B>,
    sink: S,
    surface: C,
    event_rx: mpsc::Receiver<RunEvent>,
}

impl<B, S, C> fmt::Debug for Orchestrator<B, S, C>
where
    B: ProcessBackend,
    S: OutputSink,
    C: ControlSurface,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("core", &self.core)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

impl<B, S, C> Orchestrator<B, S, C>
where
    B: ProcessBackend,
    S: OutputSink,
    C: ControlSurface,
{
    pub fn new(
        builder: CommandBuilder,
        backend: B,
        fs: Arc<dyn FileSystem>,
        sink: S,
        surface: C,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            core: RunStateMachine::new(),
            builder,
            supervisor: ProcessSupervisor::new(backend, fs, event_tx),
            sink,
            surface,
            event_rx,
        }
    }

    pub fn state(&self) -> RunState {
        self.core.state()
    }

    /// True from the accepted request until the verdict has been delivered,
    /// including the window where the process is gone but output is still
    /// draining.
    pub fn is_running(&self) -> bool {
        self.core.state() != RunState::Idle || self.supervisor.is_running()
    }

    pub fn last_verdict(&self) -> Option<&RunVerdict> {
        self.core.last_verdict()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    /// Validate `snapshot`, check the script and launch the run.
    ///
    /// Returns without waiting for the process. `AlreadyRunning` leaves
    /// everything untouched; precondition errors return the state machine to
    /// `Idle` before they are returned.
    pub fn request_run(&mut self, snapshot: ConfigSnapshot) -> Result<RunId> {
        let step = self.core.begin()?;
        self.execute(step);

        let command = match self.builder.build(&snapshot) {
            Ok(command) => command,
            Err(e) => return Err(self.abort(e)),
        };

        let run_id = match self.supervisor.start(command.clone()) {
            Ok(run_id) => run_id,
            Err(e) => return Err(self.abort(e)),
        };

        self.sink.begin_run(&command);
        let step = self.core.mark_running(run_id);
        self.execute(step);

        info!(run_id, command = %command, "maintenance run started");
        Ok(run_id)
    }

    /// Apply one event from the readers or exit watcher.
    pub fn handle_event(&mut self, event: RunEvent) {
        if let RunEvent::Finished { run_id, .. } = &event {
            self.supervisor.release(*run_id);
        }

        let step = self.core.step(event);
        self.execute(step);

        if self.core.state() == RunState::Finalizing {
            let step = self.core.finish();
            self.execute(step);
        }
    }

    /// Process events until the current run (if any) is back to `Idle`, and
    /// return the most recent verdict.
    pub async fn run_to_completion(&mut self) -> Option<RunVerdict> {
        while self.core.state() != RunState::Idle {
            match self.event_rx.recv().await {
                Some(event) => self.handle_event(event),
                None => {
                    warn!("event channel closed while a run was active");
                    break;
                }
            }
        }
        self.core.last_verdict().cloned()
    }

    /// Main loop: serve run requests while draining run events.
    ///
    /// Requests arriving during a run are answered with `AlreadyRunning`
    /// straight away. When the request channel closes, the current run is
    /// finished and the last verdict is returned.
    pub async fn serve(mut self, mut requests: mpsc::Receiver<RunRequest>) -> Option<RunVerdict> {
        info!("orchestrator started");

        loop {
            tokio::select! {
                request = requests.recv() => match request {
                    Some(RunRequest { snapshot, reply }) => {
                        let result = self.request_run(snapshot);
                        if reply.send(result).is_err() {
                            debug!("run requester went away before the reply");
                        }
                    }
                    None => {
                        debug!("request channel closed; finishing current run");
                        break;
                    }
                },
                Some(event) = self.event_rx.recv() => self.handle_event(event),
            }
        }

        let verdict = self.run_to_completion().await;
        info!("orchestrator exiting");
        verdict
    }

    fn abort(&mut self, error: crate::errors::FedorableError) -> crate::errors::FedorableError {
        warn!(error = %error, "run refused before start");
        let step = self.core.abort_start();
        self.execute(step);
        error
    }

    fn execute(&mut self, step: CoreStep) {
        for command in step.commands {
            match command {
                CoreCommand::LockSurface => self.surface.lock(),
                CoreCommand::UnlockSurface => self.surface.unlock(),
                CoreCommand::Append(chunk) => self.sink.append(&chunk),
                CoreCommand::Report(verdict) => self.sink.finish(&verdict),
            }
        }
    }
}
