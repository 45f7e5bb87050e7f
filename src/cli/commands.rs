//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{BeadConfig, HostKeyPolicy};
use crate::orchestrator::DeployOptions;

/// Bead - deploy a containerized service onto a remote host.
#[derive(Parser, Debug)]
#[command(name = "bead")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the bead manifest.
    #[arg(short = 'C', long, global = true, env = "BEAD_PROJECT_DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Directory holding the provisioning script (defaults to `scripts/` next to the binary).
    #[arg(long, global = true, env = "BEAD_SCRIPTS_DIR")]
    pub scripts_dir: Option<PathBuf>,

    /// How unknown host keys are handled.
    #[arg(long, global = true, env = "BEAD_HOST_KEY_POLICY", default_value = "add")]
    pub host_key_policy: HostKeyPolicy,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a bead manifest in the project directory.
    Init {
        /// Name of the service.
        service_name: String,

        /// Overwrite an existing manifest.
        #[arg(short, long)]
        force: bool,
    },

    /// Set the host the bead is deployed to.
    SetHost {
        /// SSH login user.
        username: String,

        /// IP address or hostname.
        ip: String,

        /// Private key used to authenticate.
        key_file: PathBuf,
    },

    /// Provision the bead on its host.
    Deploy {
        /// Public domain name served by the reverse proxy.
        #[arg(short, long)]
        domain: Option<String>,

        /// Local env file forwarded to the container.
        #[arg(short, long)]
        env_file: Option<PathBuf>,

        /// Container image reference.
        #[arg(short, long)]
        image: Option<String>,

        /// Container port, replacing the stored one.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Request a TLS certificate for the bead's domain.
    ObtainCertificate,

    /// Start the bead and reload the reverse proxy.
    Run,

    /// Show the manifest and deployment stage.
    Show,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds tool settings from the global flags.
    #[must_use]
    pub fn bead_config(&self) -> BeadConfig {
        let config = BeadConfig::new(&self.project_dir).with_host_key_policy(self.host_key_policy);
        match &self.scripts_dir {
            Some(dir) => config.with_scripts_dir(dir),
            None => config,
        }
    }
}

impl Commands {
    /// Returns deploy options if this is the `deploy` command.
    #[must_use]
    pub fn deploy_options(&self) -> Option<DeployOptions> {
        match self {
            Self::Deploy {
                domain,
                env_file,
                image,
                port,
            } => Some(DeployOptions {
                domain_name: domain.clone(),
                env_file: env_file.clone(),
                image: image.clone(),
                container_port: *port,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_deploy_flags() {
        let cli = Cli::try_parse_from([
            "bead",
            "deploy",
            "--domain",
            "api.example.com",
            "--image",
            "org/api:1.0",
            "--port",
            "8080",
        ])
        .expect("parse");

        let options = cli.command.deploy_options().expect("deploy options");
        assert_eq!(options.domain_name.as_deref(), Some("api.example.com"));
        assert_eq!(options.image.as_deref(), Some("org/api:1.0"));
        assert_eq!(options.container_port, Some(8080));
        assert_eq!(options.env_file, None);
    }

    #[test]
    fn test_set_host_positionals() {
        let cli = Cli::try_parse_from(["bead", "set-host", "ubuntu", "203.0.113.5", "/key.pem"])
            .expect("parse");

        match cli.command {
            Commands::SetHost {
                username,
                ip,
                key_file,
            } => {
                assert_eq!(username, "ubuntu");
                assert_eq!(ip, "203.0.113.5");
                assert_eq!(key_file, PathBuf::from("/key.pem"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_build_config() {
        let cli = Cli::try_parse_from([
            "bead",
            "--project-dir",
            "/srv/api",
            "--scripts-dir",
            "/opt/bead/scripts",
            "--host-key-policy",
            "strict",
            "run",
        ])
        .expect("parse");

        let config = cli.bead_config();
        assert_eq!(config.project_dir, PathBuf::from("/srv/api"));
        assert_eq!(config.scripts_dir, PathBuf::from("/opt/bead/scripts"));
        assert_eq!(config.host_key_policy, HostKeyPolicy::Strict);
        assert!(cli.command.deploy_options().is_none());
    }
}
