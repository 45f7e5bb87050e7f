//! Orchestration of bead operations.
//!
//! This module ties the manifest store and remote sessions together:
//! - Guards for the preconditions each operation needs
//! - Remote command templates
//! - The `Orchestrator` running init, set-host, deploy, certificate and run

mod commands;
mod guards;
mod operations;

pub use commands::{
    DeployParams, compose_up, deploy as deploy_command, obtain_certificate, reload_proxy,
};
pub use guards::{
    open_session, release_session, require_deployed, require_domain, require_host,
    require_manifest,
};
pub use operations::{DeployOptions, Orchestrator};
