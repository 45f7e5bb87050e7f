//! Error types for the bead deployment tool.
//!
//! This module provides the error hierarchy for every stage of a bead's
//! lifecycle: manifest handling, input validation, SSH connections, file
//! transfer and remote command execution.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the bead deployment tool.
#[derive(Debug, Error)]
pub enum BeadError {
    /// Manifest-related errors.
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Input validation errors.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// SSH connection errors.
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// File transfer errors.
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Remote command errors.
    #[error("Remote command error: {0}")]
    RemoteCommand(#[from] RemoteCommandError),

    /// Tool configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Manifest-related errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// No manifest exists in the project directory.
    #[error("Bead manifest not found at {}. Did you mean to run 'init' first?", path.display())]
    Missing {
        /// Expected manifest location.
        path: PathBuf,
    },

    /// A manifest already exists and would be overwritten.
    #[error("Bead manifest already exists at {} (use --force to overwrite)", path.display())]
    AlreadyExists {
        /// Location of the existing manifest.
        path: PathBuf,
    },

    /// The manifest could not be read or parsed.
    #[error("Manifest is corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// The manifest could not be serialized.
    #[error("Manifest serialization error: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
    },

    /// The manifest could not be written to disk.
    #[error("Failed to write manifest: {message}")]
    Write {
        /// Description of the write failure.
        message: String,
    },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is absent after resolving arguments against the manifest.
    #[error("A value for '{field}' is required")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// A field has an unusable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// The requested container port is outside the allowed range.
    #[error("Container port {port} is outside the allowed range [1024, 49151)")]
    PortOutOfRange {
        /// The rejected port.
        port: u16,
    },

    /// The manifest has no host yet.
    #[error("No host configured. Run 'set-host' first")]
    HostNotConfigured,
}

/// SSH connection errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The host was unreachable, refused authentication, or the key was unusable.
    #[error("Failed to connect to {destination}: {message}")]
    Failed {
        /// `user@host` that was dialed.
        destination: String,
        /// Underlying cause.
        message: String,
    },

    /// The session could not be shut down cleanly.
    #[error("Failed to close SSH session: {message}")]
    Close {
        /// Underlying cause.
        message: String,
    },
}

/// File transfer errors.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The local source file does not exist.
    #[error("Local file '{}' not found", path.display())]
    LocalFileNotFound {
        /// Missing local path.
        path: PathBuf,
    },

    /// Any other transfer failure.
    #[error("Failed to transfer '{}' to '{remote}': {message}", local.display())]
    Failed {
        /// Local source path.
        local: PathBuf,
        /// Remote destination path.
        remote: String,
        /// Underlying cause.
        message: String,
    },
}

/// Remote command errors.
#[derive(Debug, Error)]
pub enum RemoteCommandError {
    /// The remote command ran and exited unsuccessfully.
    #[error("`{command}` exited with {}", describe_code(*code))]
    NonZeroExit {
        /// Displayed (redacted) command line.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// The remote command could not be started or its output could not be read.
    #[error("Failed to execute `{command}`: {message}")]
    Execution {
        /// Displayed (redacted) command line.
        command: String,
        /// Underlying cause.
        message: String,
    },
}

fn describe_code(code: Option<i32>) -> String {
    code.map_or_else(|| String::from("no exit code"), |c| format!("exit code {c}"))
}

/// Result type alias for bead operations.
pub type Result<T> = std::result::Result<T, BeadError>;

impl BeadError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error can only occur after remote side effects may have started.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Transfer(TransferError::Failed { .. }) | Self::RemoteCommand(_))
    }
}

impl ValidationError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid-field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ConnectionError {
    /// Creates a connection failure for `destination`.
    #[must_use]
    pub fn failed(destination: impl Into<String>, message: impl ToString) -> Self {
        Self::Failed {
            destination: destination.into(),
            message: message.to_string(),
        }
    }
}

impl RemoteCommandError {
    /// Creates an execution error for the displayed command.
    #[must_use]
    pub fn execution(command: impl Into<String>, message: impl ToString) -> Self {
        Self::Execution {
            command: command.into(),
            message: message.to_string(),
        }
    }
}
