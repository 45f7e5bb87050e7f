//! Remote command templates.

use crate::config::BeadConfig;
use crate::remote::RemoteCommand;

/// Directory on the host holding each bead's compose file.
const BEADS_DIR: &str = "/beads";

/// Resolved values a deploy sends to the provisioning script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams<'a> {
    /// Service name.
    pub service_name: &'a str,
    /// Public domain name.
    pub domain_name: &'a str,
    /// Container port.
    pub container_port: u16,
    /// Container image reference.
    pub image: &'a str,
    /// Env file contents; empty means none.
    pub env_file_content: &'a str,
}

/// `sudo <interpreter> <script> --service-name .. --domain-name .. --container-port .. --image .. [--env-file-content ..]`
#[must_use]
pub fn deploy(config: &BeadConfig, params: &DeployParams<'_>) -> RemoteCommand {
    let command = RemoteCommand::new("sudo")
        .arg(&config.interpreter)
        .arg(&config.remote_script_path)
        .args(["--service-name", params.service_name])
        .args(["--domain-name", params.domain_name])
        .arg("--container-port")
        .arg(params.container_port.to_string())
        .args(["--image", params.image]);

    if params.env_file_content.is_empty() {
        command
    } else {
        command
            .arg("--env-file-content")
            .secret_arg(params.env_file_content)
    }
}

/// `sudo certbot --nginx -d <domain>`
#[must_use]
pub fn obtain_certificate(domain_name: &str) -> RemoteCommand {
    RemoteCommand::new("sudo")
        .args(["certbot", "--nginx", "-d"])
        .arg(domain_name)
}

/// `docker-compose -f /beads/<service>.yml up -d`
#[must_use]
pub fn compose_up(service_name: &str) -> RemoteCommand {
    RemoteCommand::new("docker-compose")
        .arg("-f")
        .arg(format!("{BEADS_DIR}/{service_name}.yml"))
        .args(["up", "-d"])
}

/// `sudo systemctl reload nginx`
#[must_use]
pub fn reload_proxy() -> RemoteCommand {
    RemoteCommand::new("sudo").args(["systemctl", "reload", "nginx"])
}
