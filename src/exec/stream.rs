// src/exec/stream.rs

//! Incremental reader for one output channel of the maintenance script.
//!
//! A [`StreamReader`] turns whatever bytes are currently available on the
//! channel into [`OutputChunk`]s. Chunks follow read boundaries, not line
//! boundaries; the only adjustment is that a UTF-8 character split across two
//! reads is held back until it is complete.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{ChunkKind, OutputChunk, RunEvent, RunId};
use crate::types::OutputSource;

pub const READ_BUFFER_SIZE: usize = 8192;

#[derive(Debug)]
enum ReaderState {
    Open,
    /// Undecodable bytes were seen; the marker chunk is still owed.
    DecodeFailed(String),
    /// Marker delivered; discard the rest so the child never blocks on a full pipe.
    Draining,
    Closed,
}

#[derive(Debug)]
pub struct StreamReader<R> {
    source: OutputSource,
    reader: R,
    buf: Box<[u8]>,
    pending: Vec<u8>,
    next_seq: u64,
    state: ReaderState,
}

impl<R: AsyncRead + Unpin> StreamReader<R> {
    pub fn new(source: OutputSource, reader: R) -> Self {
        Self {
            source,
            reader,
            buf: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            pending: Vec::new(),
            next_seq: 0,
            state: ReaderState::Open,
        }
    }

    /// Next chunk, or `None` once the channel is exhausted.
    ///
    /// After a read or decoding error exactly one `StreamError` chunk is
    /// produced and the sequence ends.
    pub async fn next_chunk(&mut self) -> Option<OutputChunk> {
        loop {
            match std::mem::replace(&mut self.state, ReaderState::Open) {
                ReaderState::Closed => {
                    self.state = ReaderState::Closed;
                    return None;
                }
                ReaderState::Draining => {
                    self.drain_to_eof().await;
                    self.state = ReaderState::Closed;
                    return None;
                }
                ReaderState::DecodeFailed(detail) => {
                    self.state = ReaderState::Draining;
                    return Some(self.error_chunk(&detail));
                }
                ReaderState::Open => {}
            }

            let n = match self.reader.read(&mut self.buf).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(source = %self.source, error = %e, "read failed; closing stream");
                    self.state = ReaderState::Closed;
                    return Some(self.error_chunk(&e.to_string()));
                }
            };

            if n == 0 {
                self.state = ReaderState::Closed;
                if self.pending.is_empty() {
                    return None;
                }
                let detail = format!(
                    "incomplete UTF-8 sequence at end of stream ({} byte(s))",
                    self.pending.len()
                );
                self.pending.clear();
                return Some(self.error_chunk(&detail));
            }

            self.pending.extend_from_slice(&self.buf[..n]);

            let valid = match std::str::from_utf8(&self.pending) {
                Ok(_) => self.pending.len(),
                Err(e) => {
                    if e.error_len().is_some() {
                        let detail = format!(
                            "invalid UTF-8 after {} decoded byte(s) in this read",
                            e.valid_up_to()
                        );
                        self.pending.truncate(e.valid_up_to());
                        self.state = ReaderState::DecodeFailed(detail);
                    }
                    e.valid_up_to()
                }
            };

            if valid == 0 {
                // Only the first bytes of a multi-byte character so far.
                continue;
            }

            let text = String::from_utf8_lossy(&self.pending[..valid]).into_owned();
            self.pending.drain(..valid);
            return Some(self.data_chunk(text));
        }
    }

    /// Push every chunk into `events` for `run_id`, then report the stream as
    /// closed. Keeps reading after the receiver is gone.
    pub async fn forward(mut self, run_id: RunId, events: mpsc::Sender<RunEvent>) {
        let mut receiver_gone = false;

        while let Some(chunk) = self.next_chunk().await {
            if receiver_gone {
                continue;
            }
            if events.send(RunEvent::Chunk { run_id, chunk }).await.is_err() {
                debug!(run_id, source = %self.source, "event receiver dropped; discarding output");
                receiver_gone = true;
            }
        }

        debug!(run_id, source = %self.source, "stream reached end");
        let _ = events
            .send(RunEvent::StreamClosed {
                run_id,
                source: self.source,
            })
            .await;
    }

    async fn drain_to_eof(&mut self) {
        loop {
            match self.reader.read(&mut self.buf).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(_) => break,
            }
        }
    }

    fn data_chunk(&mut self, text: String) -> OutputChunk {
        self.chunk(ChunkKind::Data, text)
    }

    fn error_chunk(&mut self, detail: &str) -> OutputChunk {
        self.chunk(
            ChunkKind::StreamError,
            format!("\n[stream error on {}: {}]\n", self.source, detail),
        )
    }

    fn chunk(&mut self, kind: ChunkKind, text: String) -> OutputChunk {
        let sequence_no = self.next_seq;
        self.next_seq += 1;
        OutputChunk {
            source: self.source,
            kind,
            text,
            sequence_no,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Yields one scripted piece per read call.
    struct Pieces(VecDeque<io::Result<Vec<u8>>>);

    impl Pieces {
        fn new(pieces: Vec<io::Result<Vec<u8>>>) -> Self {
            Self(pieces.into())
        }
    }

    impl AsyncRead for Pieces {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.0.pop_front() {
                None => Poll::Ready(Ok(())),
                Some(Ok(bytes)) => {
                    buf.put_slice(&bytes);
                    Poll::Ready(Ok(()))
                }
                Some(Err(e)) => Poll::Ready(Err(e)),
            }
        }
    }

    async fn collect<R: AsyncRead + Unpin>(mut reader: StreamReader<R>) -> Vec<OutputChunk> {
        let mut out = Vec::new();
        while let Some(chunk) = reader.next_chunk().await {
            out.push(chunk);
        }
        out
    }

    #[tokio::test]
    async fn partial_lines_pass_through_in_order() {
        let reader = StreamReader::new(
            OutputSource::Stdout,
            Pieces::new(vec![Ok(b"Updating pack".to_vec()), Ok(b"ages...\ndone".to_vec())]),
        );
        let chunks = collect(reader).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].sequence_no, 0);
        assert_eq!(chunks[1].sequence_no, 1);
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, "Updating packages...\ndone");
    }

    #[tokio::test]
    async fn split_multibyte_character_is_reassembled() {
        // "é" is 0xC3 0xA9
        let reader = StreamReader::new(
            OutputSource::Stderr,
            Pieces::new(vec![Ok(vec![b'c', b'a', b'f', 0xC3]), Ok(vec![0xA9, b'!'])]),
        );
        let chunks = collect(reader).await;

        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, "café!");
        assert!(chunks.iter().all(|c| c.is_data() && c.source == OutputSource::Stderr));
    }

    #[tokio::test]
    async fn invalid_utf8_yields_prefix_then_single_marker() {
        let reader = StreamReader::new(
            OutputSource::Stdout,
            Pieces::new(vec![
                Ok(vec![b'o', b'k', 0xFF, b'x']),
                Ok(b"ignored".to_vec()),
            ]),
        );
        let chunks = collect(reader).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "ok");
        assert_eq!(chunks[1].kind, ChunkKind::StreamError);
        assert!(chunks[1].text.contains("stream error on stdout"));
    }

    #[tokio::test]
    async fn read_error_ends_stream_with_marker() {
        let reader = StreamReader::new(
            OutputSource::Stderr,
            Pieces::new(vec![
                Ok(b"warn\n".to_vec()),
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe gone")),
                Ok(b"never seen".to_vec()),
            ]),
        );
        let chunks = collect(reader).await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].kind, ChunkKind::StreamError);
        assert!(chunks[1].text.contains("pipe gone"));
    }

    #[tokio::test]
    async fn truncated_character_at_eof_is_reported() {
        let reader = StreamReader::new(OutputSource::Stdout, Pieces::new(vec![Ok(vec![0xE2, 0x82])]));
        let chunks = collect(reader).await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].kind, ChunkKind::StreamError);
    }

    #[tokio::test]
    async fn forward_sends_chunks_then_closed() {
        let (tx, mut rx) = mpsc::channel(8);
        let reader = StreamReader::new(OutputSource::Stdout, &b"hello"[..]);
        reader.forward(7, tx).await;

        match rx.recv().await {
            Some(RunEvent::Chunk { run_id: 7, chunk }) => assert_eq!(chunk.text, "hello"),
            other => panic!("expected chunk, got {other:?}"),
        }
        assert_eq!(
            rx.recv().await,
            Some(RunEvent::StreamClosed {
                run_id: 7,
                source: OutputSource::Stdout
            })
        );
    }
}
