//! Connection and session seams.
//!
//! The orchestrator only talks to hosts through [`Connector`] and
//! [`RemoteSession`]; the production implementation lives in the `ssh` module.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use crate::error::Result;
use crate::manifest::Host;

/// Placeholder shown instead of sensitive arguments.
const REDACTED: &str = "<redacted>";

/// Opens sessions to hosts.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The session type produced by this connector.
    type Session: RemoteSession;

    /// Authenticates to `host` with its private key and returns an open session.
    ///
    /// Fails with `ConnectionError` when the host is unreachable, refuses the
    /// key, or the key cannot be used.
    async fn connect(&self, host: &Host) -> Result<Self::Session>;
}

/// An authenticated session to one host.
///
/// A session is owned by exactly one orchestrator operation and must be closed
/// by it on every exit path.
#[async_trait]
pub trait RemoteSession: Send {
    /// Runs `command`, streaming its output as it is produced, and returns its
    /// exit status without interpreting it.
    async fn execute(&mut self, command: &RemoteCommand) -> Result<ExitStatus>;

    /// Copies the local file at `local_path` to `remote_path` on the host.
    async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()>;

    /// Shuts the session down.
    async fn close(self) -> Result<()>;
}

/// A program and its arguments, to be run on the remote host.
///
/// Arguments are kept separate so the session layer can escape each one;
/// nothing is spliced into a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    program: String,
    args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Argument {
    value: String,
    sensitive: bool,
}

/// Exit status of a remote process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: Option<i32>,
}

impl RemoteCommand {
    /// Starts a command for `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Argument {
            value: value.into(),
            sensitive: false,
        });
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        values.into_iter().fold(self, |command, value| command.arg(value))
    }

    /// Appends an argument that must never be logged.
    #[must_use]
    pub fn secret_arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(Argument {
            value: value.into(),
            sensitive: true,
        });
        self
    }

    /// The program to run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The raw argument values, in order.
    pub fn arg_values(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| a.value.as_str())
    }
}

/// Renders the command as a quoted shell line with sensitive arguments redacted.
impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(self.program.as_str()).chain(
            self.args
                .iter()
                .map(|a| if a.sensitive { REDACTED } else { a.value.as_str() }),
        );

        let mut first = true;
        for word in words {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match shlex::try_quote(word) {
                Ok(quoted) => f.write_str(&quoted)?,
                Err(_) => f.write_str(REDACTED)?,
            }
        }
        Ok(())
    }
}

impl ExitStatus {
    /// Creates a status from an exit code; `None` means the process was killed.
    #[must_use]
    pub const fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    /// The exit code, if the process exited normally.
    #[must_use]
    pub const fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns true if the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self::from_code(status.code())
    }
}
