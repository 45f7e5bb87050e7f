//! Copying local files onto the remote host.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::{self, File};

use crate::error::{BeadError, Result, TransferError};
use crate::progress::{self, Tag};

use super::session::RemoteSession;

/// Copies `local_path` to `remote_path` over an open session.
///
/// The local file is checked before anything is sent. Any failure other than
/// a missing local file is reported as `TransferError::Failed`.
///
/// # Errors
///
/// Returns `TransferError::LocalFileNotFound` if the local file does not exist,
/// otherwise `TransferError::Failed` wrapping the underlying cause.
pub async fn transfer_file<S: RemoteSession>(
    session: &mut S,
    local_path: &Path,
    remote_path: &str,
) -> Result<()> {
    if !fs::try_exists(local_path).await.unwrap_or(false) {
        return Err(TransferError::LocalFileNotFound {
            path: local_path.to_path_buf(),
        }
        .into());
    }

    progress::report(
        Tag::Info,
        format!(
            "Transferring '{}' to '{remote_path}' on the server...",
            local_path.display()
        ),
    );

    session
        .transfer(local_path, remote_path)
        .await
        .map_err(|e| match e {
            BeadError::Transfer(_) => e,
            other => failed(local_path, remote_path, other),
        })?;

    progress::report(Tag::Complete, "File transferred successfully");
    Ok(())
}

/// Opens a local file for sending, classifying the failure.
pub(crate) async fn open_local(local_path: &Path, remote_path: &str) -> Result<File> {
    File::open(local_path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            TransferError::LocalFileNotFound {
                path: local_path.to_path_buf(),
            }
            .into()
        } else {
            failed(local_path, remote_path, e)
        }
    })
}

/// Builds a `TransferError::Failed` for this pair of paths.
pub(crate) fn failed(local_path: &Path, remote_path: &str, cause: impl ToString) -> BeadError {
    TransferError::Failed {
        local: local_path.to_path_buf(),
        remote: remote_path.to_string(),
        message: cause.to_string(),
    }
    .into()
}
