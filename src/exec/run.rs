// src/exec/run.rs

//! Driver for one elevated child process.

use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::command::CommandSpec;
use crate::engine::{RunEvent, RunId, RunVerdict, SENTINEL_EXIT_CODE};
use crate::exec::stream::StreamReader;
use crate::types::OutputSource;

/// How raw exit statuses map onto verdicts.
#[derive(Debug, Clone, Default)]
pub struct ExitPolicy {
    /// Exit codes of the elevation program meaning authorization was refused.
    pub denial_exit_codes: Vec<i32>,
}

impl ExitPolicy {
    pub fn verdict_for(&self, program: &str, status: ExitStatus) -> RunVerdict {
        match status.code() {
            Some(code) if self.denial_exit_codes.contains(&code) => {
                RunVerdict::spawn_failed(SENTINEL_EXIT_CODE)
                    .with_detail(format!("{program} refused elevation (exit code {code})"))
            }
            Some(code) => RunVerdict::exited(code),
            None => {
                log_signal(status);
                RunVerdict::signaled()
            }
        }
    }
}

#[cfg(unix)]
fn log_signal(status: ExitStatus) {
    use std::os::unix::process::ExitStatusExt;
    warn!(signal = ?status.signal(), "maintenance process terminated by signal");
}

#[cfg(not(unix))]
fn log_signal(_status: ExitStatus) {
    warn!("maintenance process terminated without an exit code");
}

/// Spawn `command`, drain both channels, wait for exit and send the verdict.
///
/// `Finished` is sent only after both readers have delivered their last
/// chunk and their `StreamClosed`, so nothing can trickle in after it.
pub async fn drive_run(
    run_id: RunId,
    command: CommandSpec,
    policy: ExitPolicy,
    events: mpsc::Sender<RunEvent>,
) {
    info!(run_id, command = %command, "starting maintenance process");

    let mut cmd = Command::new(command.program());
    cmd.args(command.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            error!(run_id, program = command.program(), error = %e, "failed to spawn process");
            let verdict = RunVerdict::spawn_failed(SENTINEL_EXIT_CODE)
                .with_detail(format!("failed to start {}: {e}", command.program()));
            send_finished(run_id, verdict, &events).await;
            return;
        }
    };

    debug!(run_id, pid = ?child.id(), "maintenance process spawned");

    let readers = [
        spawn_reader(run_id, OutputSource::Stdout, child.stdout.take(), &events),
        spawn_reader(run_id, OutputSource::Stderr, child.stderr.take(), &events),
    ];

    let status = child.wait().await;
    let verdict = match status {
        Ok(status) => {
            for reader in readers {
                if let Err(e) = reader.await {
                    warn!(run_id, error = %e, "stream reader task failed");
                }
            }
            policy.verdict_for(command.program(), status)
        }
        Err(e) => {
            // The child may still hold the pipes open; don't wait on it.
            error!(run_id, error = %e, "waiting for maintenance process failed");
            let _ = child.start_kill();
            for reader in &readers {
                reader.abort();
            }
            for (reader, source) in readers.into_iter().zip(OutputSource::ALL) {
                if reader.await.is_err() {
                    let _ = events.send(RunEvent::StreamClosed { run_id, source }).await;
                }
            }
            RunVerdict::spawn_failed(SENTINEL_EXIT_CODE)
                .with_detail(format!("lost track of the process: {e}"))
        }
    };

    info!(
        run_id,
        exit_code = verdict.exit_code,
        success = verdict.succeeded,
        reason = %verdict.reason,
        "maintenance process exited"
    );

    send_finished(run_id, verdict, &events).await;
}

fn spawn_reader<R>(
    run_id: RunId,
    source: OutputSource,
    pipe: Option<R>,
    events: &mpsc::Sender<RunEvent>,
) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let events = events.clone();
    tokio::spawn(async move {
        match pipe {
            Some(pipe) => StreamReader::new(source, pipe).forward(run_id, events).await,
            None => {
                warn!(run_id, %source, "no pipe attached; reporting stream as closed");
                let _ = events.send(RunEvent::StreamClosed { run_id, source }).await;
            }
        }
    })
}

async fn send_finished(run_id: RunId, verdict: RunVerdict, events: &mpsc::Sender<RunEvent>) {
    if events
        .send(RunEvent::Finished { run_id, verdict })
        .await
        .is_err()
    {
        debug!(run_id, "event receiver dropped before verdict could be delivered");
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::VerdictReason;
    use std::os::unix::process::ExitStatusExt;

    fn exited(code: i32) -> ExitStatus {
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn exit_codes_are_normal_exits_without_denial_codes() {
        let policy = ExitPolicy::default();
        let verdict = policy.verdict_for("pkexec", exited(127));
        assert_eq!(verdict.reason, VerdictReason::NormalExit);
        assert_eq!(verdict.exit_code, 127);
        assert!(!verdict.succeeded);
        assert!(policy.verdict_for("pkexec", exited(0)).succeeded);
    }

    #[test]
    fn denial_code_uses_sentinel_and_keeps_code_in_detail() {
        let policy = ExitPolicy {
            denial_exit_codes: vec![126],
        };
        let verdict = policy.verdict_for("pkexec", exited(126));
        assert_eq!(verdict.reason, VerdictReason::SpawnFailed);
        assert_eq!(verdict.exit_code, SENTINEL_EXIT_CODE);
        assert!(verdict.detail.as_deref().unwrap().contains("exit code 126"));

        assert_eq!(
            policy.verdict_for("pkexec", exited(127)).reason,
            VerdictReason::NormalExit
        );
    }

    #[test]
    fn signal_termination_is_signaled() {
        let verdict = ExitPolicy::default().verdict_for("pkexec", ExitStatus::from_raw(9));
        assert_eq!(verdict.reason, VerdictReason::Signaled);
        assert_eq!(verdict.exit_code, SENTINEL_EXIT_CODE);
    }
}
