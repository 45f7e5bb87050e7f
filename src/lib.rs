// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Bead
//!
//! Deploys a single containerized service (a "bead") onto one remote host
//! over SSH.
//!
//! ## Overview
//!
//! A bead is described by a manifest, `bead.json`, kept in the project
//! directory. The manifest is the only durable state: every operation reads
//! it fresh, and only successful operations write it back.
//!
//! - `init` creates the manifest
//! - `set-host` records the SSH coordinates of the target host
//! - `deploy` uploads the provisioning script and runs it on the host
//! - `obtain-certificate` requests a TLS certificate for the bead's domain
//! - `run` starts the container and reloads the reverse proxy
//!
//! ## Modules
//!
//! - [`manifest`]: Manifest model and storage
//! - [`remote`]: SSH sessions, streamed command execution and file transfer
//! - [`orchestrator`]: Guards and the user-facing operations
//! - [`config`]: Tool settings and deploy validation
//! - [`progress`]: Tagged progress messages
//! - [`cli`]: Command-line interface
//!
//! ## Example
//!
//! ```json
//! {
//!   "service_name": "api",
//!   "host": {
//!     "username": "ubuntu",
//!     "ip": "203.0.113.5",
//!     "ssh_key_file": "/home/me/.ssh/api.pem"
//!   },
//!   "container_port": 31337,
//!   "domain_name": "api.example.com",
//!   "env_file": ".env.production",
//!   "image": "ghcr.io/my-org/api:1.0"
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod progress;
pub mod remote;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{BeadConfig, DeployValidator, HostKeyPolicy};
pub use error::{BeadError, Result};
pub use manifest::{Host, LocalManifestStore, Manifest, ManifestStage, ManifestStore};
pub use orchestrator::{DeployOptions, Orchestrator};
pub use remote::{Connector, RemoteCommand, RemoteSession, SshConnector, SshSession};
