use std::sync::{Arc, Mutex};

use fedorable::command::CommandSpec;
use fedorable::engine::{ControlSurface, OutputChunk, OutputSink, RunVerdict};
use fedorable::types::OutputSource;

/// Everything the presentation layer was told, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    Locked,
    Unlocked,
    Began(Vec<String>),
    Chunk(OutputChunk),
    Verdict(RunVerdict),
}

/// Shared log written by [`RecordingSink`] and [`RecordingSurface`].
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    log: Arc<Mutex<Vec<Observed>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sink(&self) -> RecordingSink {
        RecordingSink {
            recorder: self.clone(),
        }
    }

    pub fn surface(&self) -> RecordingSurface {
        RecordingSurface {
            recorder: self.clone(),
        }
    }

    pub fn events(&self) -> Vec<Observed> {
        self.log.lock().unwrap().clone()
    }

    pub fn chunks(&self) -> Vec<OutputChunk> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Chunk(chunk) => Some(chunk),
                _ => None,
            })
            .collect()
    }

    /// Concatenated data text of one source, in sequence order.
    pub fn text_of(&self, source: OutputSource) -> String {
        let mut chunks: Vec<_> = self
            .chunks()
            .into_iter()
            .filter(|c| c.source == source && c.is_data())
            .collect();
        chunks.sort_by_key(|c| c.sequence_no);
        chunks.into_iter().map(|c| c.text).collect()
    }

    pub fn verdicts(&self) -> Vec<RunVerdict> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Observed::Verdict(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: Observed) {
        self.log.lock().unwrap().push(event);
    }
}

pub struct RecordingSink {
    recorder: Recorder,
}

impl OutputSink for RecordingSink {
    fn begin_run(&mut self, command: &CommandSpec) {
        self.recorder.push(Observed::Began(command.argv().to_vec()));
    }

    fn append(&mut self, chunk: &OutputChunk) {
        self.recorder.push(Observed::Chunk(chunk.clone()));
    }

    fn finish(&mut self, verdict: &RunVerdict) {
        self.recorder.push(Observed::Verdict(verdict.clone()));
    }
}

pub struct RecordingSurface {
    recorder: Recorder,
}

impl ControlSurface for RecordingSurface {
    fn lock(&mut self) {
        self.recorder.push(Observed::Locked);
    }

    fn unlock(&mut self) {
        self.recorder.push(Observed::Unlocked);
    }
}
