//! Streaming command executor.
//!
//! A remote process exposes two independent output streams and an exit
//! status. [`stream_output`] forwards every complete line from either stream
//! the moment it is readable, and keeps draining both streams after the
//! process has exited until they are closed.

use std::future::Future;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{info, warn};

use crate::error::Result;
use crate::progress::{self, Tag};

use super::session::{ExitStatus, RemoteCommand, RemoteSession};

/// One line of remote output, tagged with the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// A line written to standard output.
    Stdout(String),
    /// A line written to standard error.
    Stderr(String),
}

/// Pumps `stdout` and `stderr` line by line into `on_line` until the process
/// has exited and both streams are closed.
///
/// Lines from one stream arrive in the order they were written. Lines from
/// different streams are interleaved in whatever order they become readable.
/// The call suspends between reads; it never spins.
///
/// # Errors
///
/// Returns the error produced by `exit`, or an IO error from either stream.
pub async fn stream_output<O, E, W, F>(
    stdout: O,
    stderr: E,
    exit: W,
    mut on_line: F,
) -> Result<ExitStatus>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    W: Future<Output = Result<ExitStatus>>,
    F: FnMut(OutputLine),
{
    let mut stdout = BufReader::new(stdout).split(b'\n');
    let mut stderr = BufReader::new(stderr).split(b'\n');
    let mut stdout_open = true;
    let mut stderr_open = true;
    let mut status: Option<ExitStatus> = None;

    tokio::pin!(exit);

    loop {
        if let (false, false, Some(status)) = (stdout_open, stderr_open, status) {
            return Ok(status);
        }

        tokio::select! {
            segment = stdout.next_segment(), if stdout_open => match segment? {
                Some(bytes) => on_line(OutputLine::Stdout(decode_line(&bytes))),
                None => stdout_open = false,
            },
            segment = stderr.next_segment(), if stderr_open => match segment? {
                Some(bytes) => on_line(OutputLine::Stderr(decode_line(&bytes))),
                None => stderr_open = false,
            },
            exited = &mut exit, if status.is_none() => {
                status = Some(exited?);
            }
        }
    }
}

/// Logs a line of remote output as it arrives.
pub fn log_output(line: OutputLine) {
    match line {
        OutputLine::Stdout(text) => info!("{text}"),
        OutputLine::Stderr(text) => warn!("Error: {text}"),
    }
}

/// Runs `command` on the session, announcing it first.
///
/// The exit status is returned as-is; deciding what a failure means is left
/// to the caller.
///
/// # Errors
///
/// Returns any error raised by the session while running the command.
pub async fn execute<S: RemoteSession>(
    session: &mut S,
    command: &RemoteCommand,
) -> Result<ExitStatus> {
    progress::report(
        Tag::Initiate,
        format!("Executing command on the server: `{command}`"),
    );
    session.execute(command).await
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\r')
        .to_string()
}
