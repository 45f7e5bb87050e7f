//! Remote host access.
//!
//! This module provides the connection seam used by the orchestrator, the
//! `openssh`-backed implementation, streaming command execution and file
//! transfer.

mod executor;
mod session;
mod ssh;
mod transfer;

pub use executor::{execute, log_output, stream_output, OutputLine};
pub use session::{Connector, ExitStatus, RemoteCommand, RemoteSession};
pub use ssh::{SshConnector, SshSession};
pub use transfer::transfer_file;
