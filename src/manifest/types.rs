//! The bead manifest: the persisted deployment descriptor for one project directory.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

use crate::error::ValidationError;

/// Container ports are drawn from the registered-port range, upper bound exclusive.
pub const PORT_RANGE: Range<u16> = 1024..49151;

/// The deployment descriptor for a single bead.
///
/// `service_name` is fixed at creation and has no setter. Every other field is
/// filled in by later operations; `None` serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Name of the service, set once by `init`.
    service_name: String,
    /// Target host, replaced wholesale by `set_host`.
    #[serde(default)]
    pub host: Option<Host>,
    /// Port the container listens on behind the reverse proxy.
    #[serde(default)]
    pub container_port: Option<u16>,
    /// Public domain served by the reverse proxy.
    #[serde(default)]
    pub domain_name: Option<String>,
    /// Local env file forwarded to the provisioning script.
    #[serde(default)]
    pub env_file: Option<PathBuf>,
    /// Container image reference.
    #[serde(default)]
    pub image: Option<String>,
}

/// SSH coordinates of the target host.
///
/// All three fields are required; construction and deserialization both reject
/// blank values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HostRecord")]
pub struct Host {
    /// Login user.
    pub username: String,
    /// IP address or hostname.
    pub ip: String,
    /// Path to the private key used to authenticate.
    pub ssh_key_file: PathBuf,
}

/// Unvalidated wire form of [`Host`].
#[derive(Deserialize)]
struct HostRecord {
    username: String,
    ip: String,
    ssh_key_file: PathBuf,
}

/// Lifecycle stage derived from which manifest fields are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestStage {
    /// Only `service_name` is set.
    Initialized,
    /// A host is configured but nothing has been deployed yet.
    HostConfigured,
    /// A deploy has completed.
    Deployed,
}

impl Manifest {
    /// Creates a manifest holding only a service name.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            host: None,
            container_port: None,
            domain_name: None,
            env_file: None,
            image: None,
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the lifecycle stage implied by the populated fields.
    #[must_use]
    pub fn stage(&self) -> ManifestStage {
        let deployed = self.container_port.is_some()
            && self.domain_name.as_deref().is_some_and(|d| !d.is_empty())
            && self.image.as_deref().is_some_and(|i| !i.is_empty());

        match (&self.host, deployed) {
            (Some(_), true) => ManifestStage::Deployed,
            (Some(_), false) => ManifestStage::HostConfigured,
            (None, _) => ManifestStage::Initialized,
        }
    }
}

impl Host {
    /// Creates a host, rejecting blank fields.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first blank field.
    pub fn new(
        username: impl Into<String>,
        ip: impl Into<String>,
        ssh_key_file: impl Into<PathBuf>,
    ) -> Result<Self, ValidationError> {
        let host = Self {
            username: username.into(),
            ip: ip.into(),
            ssh_key_file: ssh_key_file.into(),
        };

        if host.username.trim().is_empty() {
            return Err(ValidationError::missing("host.username"));
        }
        if host.ip.trim().is_empty() {
            return Err(ValidationError::missing("host.ip"));
        }
        if host.ssh_key_file.as_os_str().is_empty() {
            return Err(ValidationError::missing("host.ssh_key_file"));
        }

        Ok(host)
    }

    /// Returns `username@ip`.
    #[must_use]
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.ip)
    }
}

impl TryFrom<HostRecord> for Host {
    type Error = ValidationError;

    fn try_from(record: HostRecord) -> Result<Self, Self::Error> {
        Self::new(record.username, record.ip, record.ssh_key_file)
    }
}

impl std::fmt::Display for ManifestStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::HostConfigured => write!(f, "host configured"),
            Self::Deployed => write!(f, "deployed"),
        }
    }
}
