//! Bead CLI entrypoint.
//!
//! This is the main entrypoint for the bead command-line tool.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bead::cli::{Cli, Commands, OutputFormatter};
use bead::config::load_dotenv;
use bead::error::Result;
use bead::manifest::{LocalManifestStore, ManifestStore};
use bead::orchestrator::{DeployOptions, Orchestrator};
use bead::progress::{self, Tag};
use bead::remote::SshConnector;

use tracing::debug;
use tracing_subscriber::EnvFilter;

type BeadOrchestrator = Orchestrator<LocalManifestStore, SshConnector>;

/// Main entrypoint.
fn main() -> ExitCode {
    // Load .env before parsing so it can supply BEAD_* flags
    let dotenv = load_dotenv(Path::new("."));
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    if let Err(e) = dotenv {
        progress::report(Tag::Error, e);
        return ExitCode::FAILURE;
    }

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            progress::report(Tag::Error, e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let config = cli.bead_config();
    debug!(
        "Project directory: {}, scripts directory: {}",
        config.project_dir.display(),
        config.scripts_dir.display()
    );

    let orchestrator = Orchestrator::new(
        LocalManifestStore::new(&config.project_dir),
        SshConnector::new(config.host_key_policy),
        config,
    );

    let deploy_options = cli.command.deploy_options();
    match cli.command {
        Commands::Init {
            service_name,
            force,
        } => cmd_init(&orchestrator, &service_name, force).await,
        Commands::SetHost {
            username,
            ip,
            key_file,
        } => cmd_set_host(&orchestrator, &username, &ip, key_file).await,
        Commands::Deploy { .. } => {
            cmd_deploy(&orchestrator, &deploy_options.unwrap_or_default()).await
        }
        Commands::ObtainCertificate => orchestrator.obtain_ssl_certificate().await,
        Commands::Run => cmd_run(&orchestrator, &formatter).await,
        Commands::Show => cmd_show(&orchestrator, &formatter).await,
    }
}

/// Create the manifest.
async fn cmd_init(orchestrator: &BeadOrchestrator, service_name: &str, force: bool) -> Result<()> {
    let manifest = orchestrator.init(service_name, force).await?;
    eprintln!(
        "Created {} for '{}'",
        orchestrator.store().location().display(),
        manifest.service_name()
    );
    eprintln!("Next: bead set-host <username> <ip> <key_file>");
    Ok(())
}

/// Record the target host.
async fn cmd_set_host(
    orchestrator: &BeadOrchestrator,
    username: &str,
    ip: &str,
    key_file: PathBuf,
) -> Result<()> {
    orchestrator.set_host(username, ip, key_file).await?;
    eprintln!("Next: bead deploy --domain <domain> --image <image>");
    Ok(())
}

/// Provision the bead.
async fn cmd_deploy(orchestrator: &BeadOrchestrator, options: &DeployOptions) -> Result<()> {
    let manifest = orchestrator.deploy(options).await?;
    if let Some(port) = manifest.container_port {
        debug!("Container port: {port}");
    }
    Ok(())
}

/// Start the bead.
async fn cmd_run(orchestrator: &BeadOrchestrator, formatter: &OutputFormatter) -> Result<()> {
    let url = orchestrator.run().await?;
    println!("{}", formatter.format_url(&url));
    Ok(())
}

/// Print the manifest.
async fn cmd_show(orchestrator: &BeadOrchestrator, formatter: &OutputFormatter) -> Result<()> {
    let manifest = orchestrator.show().await?;
    println!("{}", formatter.format_manifest(&manifest));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bead::config::BeadConfig;

    #[tokio::test]
    async fn test_cmd_init_writes_manifest() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let orchestrator = Orchestrator::new(
            LocalManifestStore::new(temp.path()),
            SshConnector::default(),
            BeadConfig::new(temp.path()),
        );

        cmd_init(&orchestrator, "My_API", false).await.expect("init");

        let manifest = orchestrator.show().await.expect("show");
        assert_eq!(manifest.service_name(), "My_API");
        assert!(orchestrator.store().location().ends_with("bead.json"));
    }
}
