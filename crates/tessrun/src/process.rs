//! Bounded engine execution: spawn, drain, wait, terminate.
//!
//! The engine is an opaque external program with no cooperative cancellation
//! API; the only lever is OS-level termination. This module owns the whole
//! lifecycle of one child process:
//!
//! - both pipe drains are running before the bounded wait starts - a full
//!   OS pipe buffer would block the engine indefinitely
//! - the wait races the child's exit against the deadline and the caller's
//!   cancellation token
//! - on timeout or cancellation the child is killed and reaped before the
//!   error is returned; the child never outlives the call
use std::process::ExitStatus;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::invocation::EngineInvocation;

/// Bytes retained per drained stream. Reading continues past the cap so the
/// pipe never backs up; the excess is discarded.
const DRAIN_CAP: usize = 64 * 1024;

/// Outcome of a bounded engine run that ended with the child exiting on its
/// own. The exit status is carried for diagnostics but is not a
/// success/failure signal; the presence of the output file is.
#[derive(Debug)]
pub struct EngineExit {
    pub status: ExitStatus,
    /// Captured diagnostic output. Advisory only; never fails the run.
    pub stderr: String,
}

/// Run the invocation to completion within `timeout`, or kill it.
///
/// Exactly one terminal state is reached: the child exited (`Ok`), the
/// deadline elapsed (`Err(Timeout)`), or `cancel` fired (`Err(Cancelled)`).
/// In the two error states the child has been terminated and reaped before
/// the function returns.
pub async fn run_engine(
    invocation: &EngineInvocation,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<EngineExit> {
    let mut child = invocation
        .command()
        .spawn()
        .map_err(|source| EngineError::Launch {
            program: invocation.program().display().to_string(),
            source,
        })?;

    let stdout_task = spawn_drain(child.stdout.take());
    let stderr_task = spawn_drain(child.stderr.take());

    let status = tokio::select! {
        waited = child.wait() => match waited {
            Ok(status) => status,
            Err(err) => {
                terminate(&mut child).await;
                join_drain(stdout_task).await;
                join_drain(stderr_task).await;
                return Err(EngineError::Io(err));
            }
        },
        _ = tokio::time::sleep(timeout) => {
            terminate(&mut child).await;
            join_drain(stdout_task).await;
            join_drain(stderr_task).await;
            return Err(EngineError::Timeout { seconds: timeout.as_secs() });
        }
        _ = cancel.cancelled() => {
            terminate(&mut child).await;
            join_drain(stdout_task).await;
            join_drain(stderr_task).await;
            return Err(EngineError::Cancelled);
        }
    };

    let stdout = join_drain(stdout_task).await;
    let stderr = join_drain(stderr_task).await;

    if !stdout.is_empty() {
        debug!(output = %stdout, "engine stdout");
    }
    if !status.success() {
        // Non-zero exit is not escalated; a missing output file is the
        // actual failure signal. Keep the diagnostics observable.
        warn!(code = ?status.code(), stderr = %stderr, "engine exited non-zero");
    } else if !stderr.is_empty() {
        debug!(stderr = %stderr, "engine stderr");
    }

    Ok(EngineExit { status, stderr })
}

/// Kill and reap. Waiting after the kill signal keeps the child from
/// lingering as a zombie in the process table.
async fn terminate(child: &mut Child) {
    if let Err(err) = child.start_kill() {
        debug!(error = %err, "engine exited before kill signal");
    }
    let _ = child.wait().await;
}

fn spawn_drain<R>(stream: Option<R>) -> Option<JoinHandle<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    stream.map(|reader| tokio::spawn(drain(reader)))
}

/// Consume a pipe until end-of-stream, retaining at most [`DRAIN_CAP`]
/// bytes. I/O errors end the drain without propagating anywhere.
async fn drain<R: AsyncRead + Unpin>(mut stream: R) -> String {
    let mut retained = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if retained.len() < DRAIN_CAP {
                    let take = n.min(DRAIN_CAP - retained.len());
                    retained.extend_from_slice(&buf[..take]);
                }
            }
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&retained).into_owned()
}

async fn join_drain(task: Option<JoinHandle<String>>) -> String {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => String::new(),
    }
}
