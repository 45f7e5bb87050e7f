//! SSH sessions backed by the [`openssh`] crate.
//!
//! Connections go through an OpenSSH control master, authenticated with the
//! host's private key. Commands and file transfers both run over that one
//! session.

use async_trait::async_trait;
use openssh::{KnownHosts, Session, SessionBuilder, Stdio};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::HostKeyPolicy;
use crate::error::{BeadError, ConnectionError, RemoteCommandError, Result};
use crate::manifest::Host;
use crate::progress::{self, Tag};

use super::executor;
use super::session::{Connector, ExitStatus, RemoteCommand, RemoteSession};
use super::transfer;

/// Production implementation of [`Connector`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector {
    host_key_policy: HostKeyPolicy,
}

/// Production implementation of [`RemoteSession`].
pub struct SshSession {
    session: Session,
    destination: String,
}

impl SshConnector {
    /// Creates a connector with the given host key policy.
    #[must_use]
    pub const fn new(host_key_policy: HostKeyPolicy) -> Self {
        Self { host_key_policy }
    }

    const fn known_hosts(&self) -> KnownHosts {
        match self.host_key_policy {
            HostKeyPolicy::Strict => KnownHosts::Strict,
            HostKeyPolicy::Add => KnownHosts::Add,
            HostKeyPolicy::Accept => KnownHosts::Accept,
        }
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Session = SshSession;

    async fn connect(&self, host: &Host) -> Result<SshSession> {
        let destination = host.destination();
        progress::report(
            Tag::Info,
            format!("*** Establishing SSH connection to {} ***", host.ip),
        );

        if !tokio::fs::try_exists(&host.ssh_key_file).await.unwrap_or(false) {
            return Err(ConnectionError::failed(
                &destination,
                format!("private key '{}' not found", host.ssh_key_file.display()),
            )
            .into());
        }

        let mut builder = SessionBuilder::default();
        builder
            .user(host.username.clone())
            .keyfile(&host.ssh_key_file)
            .known_hosts_check(self.known_hosts());

        let session = builder
            .connect_mux(&host.ip)
            .await
            .map_err(|e| ConnectionError::failed(&destination, e))?;

        progress::report(Tag::Success, "SSH connection established");

        Ok(SshSession {
            session,
            destination,
        })
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    async fn execute(&mut self, command: &RemoteCommand) -> Result<ExitStatus> {
        let shown = command.to_string();

        let mut remote = self.session.command(command.program());
        for value in command.arg_values() {
            remote.arg(value);
        }
        remote
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = remote
            .spawn()
            .await
            .map_err(|e| RemoteCommandError::execution(&shown, e))?;

        let stdout = child
            .stdout()
            .take()
            .ok_or_else(|| RemoteCommandError::execution(&shown, "stdout was not captured"))?;
        let stderr = child
            .stderr()
            .take()
            .ok_or_else(|| RemoteCommandError::execution(&shown, "stderr was not captured"))?;

        let exit = async {
            child
                .wait()
                .await
                .map(ExitStatus::from)
                .map_err(|e| BeadError::from(RemoteCommandError::execution(&shown, e)))
        };

        let status = executor::stream_output(stdout, stderr, exit, executor::log_output).await?;
        debug!("`{shown}` on {} finished with {status:?}", self.destination);
        Ok(status)
    }

    async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
        let mut file = transfer::open_local(local_path, remote_path).await?;

        let mut remote = self.session.command("tee");
        remote
            .arg(remote_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = remote
            .spawn()
            .await
            .map_err(|e| transfer::failed(local_path, remote_path, e))?;

        let mut stdin = child
            .stdin()
            .take()
            .ok_or_else(|| transfer::failed(local_path, remote_path, "stdin was not captured"))?;

        let bytes = tokio::io::copy(&mut file, &mut stdin)
            .await
            .map_err(|e| transfer::failed(local_path, remote_path, e))?;
        stdin
            .shutdown()
            .await
            .map_err(|e| transfer::failed(local_path, remote_path, e))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| transfer::failed(local_path, remote_path, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(transfer::failed(local_path, remote_path, stderr.trim()));
        }

        debug!("Sent {bytes} bytes to {}:{remote_path}", self.destination);
        Ok(())
    }

    async fn close(self) -> Result<()> {
        debug!("Closing SSH session to {}", self.destination);
        self.session.close().await.map_err(|e| {
            BeadError::from(ConnectionError::Close {
                message: e.to_string(),
            })
        })
    }
}
