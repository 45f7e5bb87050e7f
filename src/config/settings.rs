//! Tool settings: where the project lives, where the provisioning script is
//! found locally and placed remotely, and how host keys are treated.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{BeadError, Result};

/// File name of the provisioning script, locally and remotely.
pub const SCRIPT_NAME: &str = "add_bead_to_server.py";

/// Where the provisioning script is placed on the host.
pub const REMOTE_SCRIPT_PATH: &str = "/tmp/add_bead_to_server.py";

/// Interpreter used to run the provisioning script on the host.
pub const DEFAULT_INTERPRETER: &str = "python3";

/// Directory, next to the executable, holding bundled scripts.
const SCRIPTS_DIR: &str = "scripts";

/// How unknown or changed host keys are handled when connecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum HostKeyPolicy {
    /// Refuse hosts that are not already in `known_hosts`.
    Strict,
    /// Add unknown hosts to `known_hosts`, refuse changed keys.
    #[default]
    Add,
    /// Accept any key without recording it.
    Accept,
}

/// Settings shared by all bead operations.
#[derive(Debug, Clone)]
pub struct BeadConfig {
    /// Directory holding the manifest.
    pub project_dir: PathBuf,
    /// Directory holding the local provisioning script.
    pub scripts_dir: PathBuf,
    /// Remote destination of the provisioning script.
    pub remote_script_path: String,
    /// Interpreter that runs the provisioning script.
    pub interpreter: String,
    /// Host key handling for SSH connections.
    pub host_key_policy: HostKeyPolicy,
}

impl Default for BeadConfig {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            scripts_dir: default_scripts_dir(),
            remote_script_path: String::from(REMOTE_SCRIPT_PATH),
            interpreter: String::from(DEFAULT_INTERPRETER),
            host_key_policy: HostKeyPolicy::default(),
        }
    }
}

impl BeadConfig {
    /// Creates settings for the given project directory with default paths.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the directory holding the provisioning script.
    #[must_use]
    pub fn with_scripts_dir(mut self, scripts_dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = scripts_dir.into();
        self
    }

    /// Sets the remote destination of the provisioning script.
    #[must_use]
    pub fn with_remote_script_path(mut self, path: impl Into<String>) -> Self {
        self.remote_script_path = path.into();
        self
    }

    /// Sets the interpreter used on the host.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// Sets the host key policy.
    #[must_use]
    pub const fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Local path of the provisioning script.
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.scripts_dir.join(SCRIPT_NAME)
    }
}

/// `scripts/` next to the running executable, falling back to the working directory.
fn default_scripts_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(SCRIPTS_DIR)
}

/// Loads `<dir>/.env` into the process environment if present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_dotenv(dir: &Path) -> Result<()> {
    let env_path = dir.join(".env");

    if env_path.exists() {
        info!("Loading environment from: {}", env_path.display());
        dotenvy::from_path(&env_path)
            .map_err(|e| BeadError::Config(format!("Failed to load .env file: {e}")))?;
    } else {
        debug!("No .env file at {}", env_path.display());
    }

    Ok(())
}
