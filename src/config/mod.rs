//! Configuration module for the bead deployment tool.
//!
//! This module handles:
//! - Tool settings (project directory, provisioning script, host key policy)
//! - Loading `.env` overrides
//! - Validation of deploy parameters before any remote I/O

mod settings;
mod validator;

pub use settings::{
    load_dotenv, BeadConfig, HostKeyPolicy, DEFAULT_INTERPRETER, REMOTE_SCRIPT_PATH, SCRIPT_NAME,
};
pub use validator::{DeployTarget, DeployValidator, ValidatedTarget};
