//! Preconditions composed in front of every orchestrator operation.
//!
//! Operations call these explicitly, in order: load the manifest, check the
//! fields the stage needs, open a session, and finally release it.

use tracing::{debug, warn};

use crate::error::{Result, ValidationError};
use crate::manifest::{Host, Manifest, ManifestStage, ManifestStore};
use crate::remote::{Connector, RemoteSession};

/// Loads the manifest, failing with `ManifestError::Missing` if there is none.
///
/// # Errors
///
/// Propagates any error from the store.
pub async fn require_manifest<S: ManifestStore + ?Sized>(store: &S) -> Result<Manifest> {
    let manifest = store.load().await?;
    debug!(
        "Loaded manifest for '{}' ({})",
        manifest.service_name(),
        manifest.stage()
    );
    Ok(manifest)
}

/// Returns the configured host.
///
/// # Errors
///
/// Returns `ValidationError::HostNotConfigured` if `set-host` has not run.
pub fn require_host(manifest: &Manifest) -> Result<&Host> {
    manifest
        .host
        .as_ref()
        .ok_or_else(|| ValidationError::HostNotConfigured.into())
}

/// Returns the manifest's domain name.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` if no deploy has recorded one.
pub fn require_domain(manifest: &Manifest) -> Result<&str> {
    manifest
        .domain_name
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ValidationError::missing("domain_name").into())
}

/// Checks that a deploy has completed.
///
/// # Errors
///
/// Returns `ValidationError::InvalidField` naming the current stage otherwise.
pub fn require_deployed(manifest: &Manifest) -> Result<()> {
    match manifest.stage() {
        ManifestStage::Deployed => Ok(()),
        stage => Err(ValidationError::invalid(
            "manifest",
            format!(
                "bead '{}' is {stage}; run 'bead deploy' first",
                manifest.service_name()
            ),
        )
        .into()),
    }
}

/// Opens a session to `host`.
///
/// # Errors
///
/// Returns `ConnectionError` if the host cannot be reached or refuses the key.
pub async fn open_session<C: Connector>(connector: &C, host: &Host) -> Result<C::Session> {
    connector.connect(host).await
}

/// Closes `session` and hands back `outcome`.
///
/// Must be called on every path once a session is open, whatever the outcome.
/// A failure to close is logged, never allowed to mask the operation's result.
pub async fn release_session<S: RemoteSession, T>(session: S, outcome: Result<T>) -> Result<T> {
    if let Err(e) = session.close().await {
        warn!("{e}");
    }
    outcome
}
