use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use fedorable::command::CommandSpec;
use fedorable::engine::{ChunkKind, OutputChunk, RunEvent, RunId, RunVerdict};
use fedorable::exec::ProcessBackend;
use fedorable::types::{OutputSource, VerdictReason};

/// A fake backend that:
/// - records every command it was asked to launch
/// - replays scripted output pieces, then closes both streams
/// - reports the scripted verdict
///
/// With [`FakeBackend::hold`] the run stays live until the returned
/// `Notify` is signalled.
#[derive(Clone)]
pub struct FakeBackend {
    output: Vec<(OutputSource, String)>,
    verdict: RunVerdict,
    gate: Option<Arc<Notify>>,
    launched: Arc<Mutex<Vec<CommandSpec>>>,
}

impl FakeBackend {
    pub fn new(output: Vec<(OutputSource, &str)>, verdict: RunVerdict) -> Self {
        Self {
            output: output
                .into_iter()
                .map(|(source, text)| (source, text.to_string()))
                .collect(),
            verdict,
            gate: None,
            launched: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hold(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Shared view of the commands launched so far.
    pub fn launched(&self) -> Arc<Mutex<Vec<CommandSpec>>> {
        Arc::clone(&self.launched)
    }
}

impl ProcessBackend for FakeBackend {
    fn launch(
        &mut self,
        run_id: RunId,
        command: CommandSpec,
        events: mpsc::Sender<RunEvent>,
    ) -> JoinHandle<()> {
        self.launched.lock().unwrap().push(command);

        let output = self.output.clone();
        let verdict = self.verdict.clone();
        let gate = self.gate.clone();

        tokio::spawn(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }

            if verdict.reason != VerdictReason::SpawnFailed {
                let mut seq = [0u64; 2];
                for (source, text) in output {
                    let idx = source as usize;
                    let chunk = OutputChunk {
                        source,
                        kind: ChunkKind::Data,
                        text,
                        sequence_no: seq[idx],
                    };
                    seq[idx] += 1;
                    let _ = events.send(RunEvent::Chunk { run_id, chunk }).await;
                }
                for source in OutputSource::ALL {
                    let _ = events.send(RunEvent::StreamClosed { run_id, source }).await;
                }
            }

            let _ = events.send(RunEvent::Finished { run_id, verdict }).await;
        })
    }
}
