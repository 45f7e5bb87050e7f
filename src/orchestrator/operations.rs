//! The user-facing bead operations.
//!
//! Each operation re-reads the manifest, checks the fields its stage needs,
//! and only then touches the network. Sessions are opened per operation and
//! released on every exit path.

use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{BeadConfig, DeployTarget, DeployValidator};
use crate::error::{ManifestError, RemoteCommandError, Result};
use crate::manifest::{Host, Manifest, ManifestStore, PORT_RANGE};
use crate::progress::{self, Tag};
use crate::remote::{self, Connector, ExitStatus, RemoteCommand, RemoteSession};

use super::commands::{self, DeployParams};
use super::guards;

/// Optional deploy arguments; each falls back to the manifest when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Public domain name.
    pub domain_name: Option<String>,
    /// Local env file whose contents are forwarded to the host.
    pub env_file: Option<PathBuf>,
    /// Container image reference.
    pub image: Option<String>,
    /// Explicit container port, replacing any stored one.
    pub container_port: Option<u16>,
}

/// Values a deploy resolved from its arguments and the manifest.
struct Resolved {
    domain_name: String,
    image: String,
    env_file: Option<PathBuf>,
    container_port: u16,
}

/// Sequences the manifest store, the connector and the remote commands.
pub struct Orchestrator<S: ManifestStore, C: Connector> {
    store: S,
    connector: C,
    config: BeadConfig,
}

impl<S: ManifestStore, C: Connector> Orchestrator<S, C> {
    /// Creates an orchestrator.
    #[must_use]
    pub const fn new(store: S, connector: C, config: BeadConfig) -> Self {
        Self {
            store,
            connector,
            config,
        }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn config(&self) -> &BeadConfig {
        &self.config
    }

    /// Returns the manifest store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates a manifest holding only `service_name`.
    ///
    /// # Errors
    ///
    /// Fails with `ManifestError::AlreadyExists` if a manifest is present and
    /// `force` is false, or with a validation error for a malformed name.
    pub async fn init(&self, service_name: &str, force: bool) -> Result<Manifest> {
        DeployValidator::check_service_name(service_name)?;

        if self.store.exists().await? {
            if !force {
                return Err(ManifestError::AlreadyExists {
                    path: self.store.location().to_path_buf(),
                }
                .into());
            }
            warn!(
                "Overwriting existing manifest at {}",
                self.store.location().display()
            );
        }

        let manifest = Manifest::new(service_name);
        self.store.save(&manifest).await?;

        progress::report(Tag::Success, "Bead initiated successfully!");
        Ok(manifest)
    }

    /// Replaces the manifest's host.
    ///
    /// # Errors
    ///
    /// Fails if there is no manifest or any host field is blank.
    pub async fn set_host(
        &self,
        username: &str,
        ip: &str,
        ssh_key_file: impl Into<PathBuf>,
    ) -> Result<Manifest> {
        let mut manifest = guards::require_manifest(&self.store).await?;
        let host = Host::new(username, ip, ssh_key_file)?;

        info!("Setting host for '{}' to {}", manifest.service_name(), host.destination());
        manifest.host = Some(host);
        self.store.save(&manifest).await?;

        progress::report(Tag::Success, "Host configured");
        Ok(manifest)
    }

    /// Provisions the bead on its host.
    ///
    /// Arguments are resolved against the manifest and validated before any
    /// connection is opened. The manifest is only updated once the remote
    /// command has exited successfully.
    ///
    /// # Errors
    ///
    /// Fails on a missing manifest or host, invalid arguments, connection,
    /// transfer or remote command failures.
    pub async fn deploy(&self, options: &DeployOptions) -> Result<Manifest> {
        let mut manifest = guards::require_manifest(&self.store).await?;
        let host = guards::require_host(&manifest)?.clone();
        let resolved = resolve(&manifest, options)?;

        let mut session = guards::open_session(&self.connector, &host).await?;
        let outcome = self
            .provision(&mut session, manifest.service_name(), &resolved)
            .await;
        guards::release_session(session, outcome).await?;

        manifest.container_port = Some(resolved.container_port);
        manifest.domain_name = Some(resolved.domain_name);
        manifest.env_file = resolved.env_file;
        manifest.image = Some(resolved.image);
        self.store.save(&manifest).await?;

        progress::report(
            Tag::Success,
            format!(
                "Successfully added bead '{}'. Run 'bead run' to launch the service",
                manifest.service_name()
            ),
        );
        Ok(manifest)
    }

    /// Requests a TLS certificate for the manifest's domain.
    ///
    /// # Errors
    ///
    /// Fails if no domain is recorded, or on connection or remote failures.
    pub async fn obtain_ssl_certificate(&self) -> Result<()> {
        let manifest = guards::require_manifest(&self.store).await?;
        let host = guards::require_host(&manifest)?;
        let command = commands::obtain_certificate(guards::require_domain(&manifest)?);

        let mut session = guards::open_session(&self.connector, host).await?;
        progress::report(Tag::Initiate, "Obtaining SSL certificate");
        let outcome = run_checked(&mut session, &command).await;
        guards::release_session(session, outcome).await?;

        progress::report(Tag::Success, "SSL certificate obtained");
        Ok(())
    }

    /// Starts the bead's container and reloads the reverse proxy.
    ///
    /// Returns the URL the bead is served on.
    ///
    /// # Errors
    ///
    /// Fails if the bead has not been deployed, or on connection or remote
    /// failures.
    pub async fn run(&self) -> Result<String> {
        let manifest = guards::require_manifest(&self.store).await?;
        guards::require_deployed(&manifest)?;
        let host = guards::require_host(&manifest)?;
        let url = format!("http://{}", guards::require_domain(&manifest)?);

        let mut session = guards::open_session(&self.connector, host).await?;
        let outcome =
            match run_checked(&mut session, &commands::compose_up(manifest.service_name())).await {
                Ok(()) => run_checked(&mut session, &commands::reload_proxy()).await,
                Err(e) => Err(e),
            };
        guards::release_session(session, outcome).await?;

        progress::report(Tag::Success, format!("Bead is now running: {url}"));
        Ok(url)
    }

    /// Returns the current manifest without touching the network.
    ///
    /// # Errors
    ///
    /// Fails if there is no manifest.
    pub async fn show(&self) -> Result<Manifest> {
        guards::require_manifest(&self.store).await
    }

    async fn provision(
        &self,
        session: &mut C::Session,
        service_name: &str,
        resolved: &Resolved,
    ) -> Result<()> {
        remote::transfer_file(
            session,
            &self.config.script_path(),
            &self.config.remote_script_path,
        )
        .await?;

        let env_file_content = read_env_file(resolved.env_file.as_deref()).await?;
        let command = commands::deploy(
            &self.config,
            &DeployParams {
                service_name,
                domain_name: &resolved.domain_name,
                container_port: resolved.container_port,
                image: &resolved.image,
                env_file_content: &env_file_content,
            },
        );

        run_checked(session, &command).await
    }
}

/// Merges deploy arguments with the manifest and validates the result.
fn resolve(manifest: &Manifest, options: &DeployOptions) -> Result<Resolved> {
    let domain_name = prefer(options.domain_name.as_deref(), manifest.domain_name.as_deref());
    let image = prefer(options.image.as_deref(), manifest.image.as_deref());
    let env_file = options
        .env_file
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| manifest.env_file.clone());

    let container_port = match (options.container_port, manifest.container_port) {
        (Some(port), _) => DeployValidator::check_port(port)?,
        (None, Some(port)) => port,
        (None, None) => {
            let port = rand::thread_rng().gen_range(PORT_RANGE);
            debug!("Selected container port {port}");
            port
        }
    };

    let validated = DeployValidator::new().validate(&DeployTarget {
        domain_name,
        image,
        container_port,
    })?;

    Ok(Resolved {
        domain_name: validated.domain_name.to_string(),
        image: validated.image.to_string(),
        env_file,
        container_port: validated.container_port,
    })
}

/// An explicit non-empty value wins over the stored one.
fn prefer<'a>(explicit: Option<&'a str>, stored: Option<&'a str>) -> Option<&'a str> {
    explicit.filter(|v| !v.is_empty()).or(stored)
}

/// Reads the env file, treating an unset or missing file as empty.
async fn read_env_file(path: Option<&Path>) -> Result<String> {
    let Some(path) = path else {
        return Ok(String::new());
    };

    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Env file '{}' not found, deploying without it", path.display());
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Executes `command` and turns a non-zero exit into an error.
async fn run_checked<R: RemoteSession>(session: &mut R, command: &RemoteCommand) -> Result<()> {
    let status = remote::execute(session, command).await?;
    ensure_success(command, status)
}

fn ensure_success(command: &RemoteCommand, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(RemoteCommandError::NonZeroExit {
            command: command.to_string(),
            code: status.code(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SCRIPT_NAME;
    use crate::error::{BeadError, ConnectionError, ValidationError};
    use crate::manifest::{LocalManifestStore, ManifestStage};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct Calls {
        connects: usize,
        transfers: Vec<(PathBuf, String)>,
        commands: Vec<RemoteCommand>,
        closes: usize,
    }

    #[derive(Debug, Clone, Copy, Default)]
    struct Behaviour {
        connect_fails: bool,
        execute_fails: bool,
        exit_code: i32,
    }

    struct FakeConnector {
        calls: Arc<Mutex<Calls>>,
        behaviour: Behaviour,
    }

    struct FakeSession {
        calls: Arc<Mutex<Calls>>,
        behaviour: Behaviour,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Session = FakeSession;

        async fn connect(&self, host: &Host) -> Result<FakeSession> {
            self.calls.lock().expect("calls").connects += 1;
            if self.behaviour.connect_fails {
                return Err(ConnectionError::failed(&host.destination(), "connection refused").into());
            }
            Ok(FakeSession {
                calls: Arc::clone(&self.calls),
                behaviour: self.behaviour,
            })
        }
    }

    #[async_trait]
    impl RemoteSession for FakeSession {
        async fn execute(&mut self, command: &RemoteCommand) -> Result<ExitStatus> {
            self.calls.lock().expect("calls").commands.push(command.clone());
            if self.behaviour.execute_fails {
                return Err(RemoteCommandError::execution(&command.to_string(), "channel closed").into());
            }
            Ok(ExitStatus::from_code(Some(self.behaviour.exit_code)))
        }

        async fn transfer(&mut self, local_path: &Path, remote_path: &str) -> Result<()> {
            self.calls
                .lock()
                .expect("calls")
                .transfers
                .push((local_path.to_path_buf(), remote_path.to_string()));
            Ok(())
        }

        async fn close(self) -> Result<()> {
            self.calls.lock().expect("calls").closes += 1;
            Ok(())
        }
    }

    struct Harness {
        temp: TempDir,
        calls: Arc<Mutex<Calls>>,
        orchestrator: Orchestrator<LocalManifestStore, FakeConnector>,
    }

    impl Harness {
        fn new(behaviour: Behaviour) -> Self {
            let temp = TempDir::new().expect("temp dir");
            let scripts_dir = temp.path().join("scripts");
            std::fs::create_dir_all(&scripts_dir).expect("scripts dir");
            std::fs::write(scripts_dir.join(SCRIPT_NAME), "print('provision')\n").expect("script");

            let calls = Arc::new(Mutex::new(Calls::default()));
            let config = BeadConfig::new(temp.path()).with_scripts_dir(&scripts_dir);
            let orchestrator = Orchestrator::new(
                LocalManifestStore::new(temp.path()),
                FakeConnector {
                    calls: Arc::clone(&calls),
                    behaviour,
                },
                config,
            );

            Self {
                temp,
                calls,
                orchestrator,
            }
        }

        async fn with_host(behaviour: Behaviour) -> Self {
            let harness = Self::new(behaviour);
            harness.orchestrator.init("api", false).await.expect("init");
            harness
                .orchestrator
                .set_host("ubuntu", "203.0.113.5", "/key.pem")
                .await
                .expect("set_host");
            harness
        }

        fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
            self.calls.lock().expect("calls")
        }

        async fn stored(&self) -> Manifest {
            self.orchestrator.store().load().await.expect("load")
        }
    }

    fn deploy_options(domain: Option<&str>, image: Option<&str>) -> DeployOptions {
        DeployOptions {
            domain_name: domain.map(String::from),
            image: image.map(String::from),
            ..DeployOptions::default()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let harness = Harness::new(Behaviour::default());
        let orchestrator = &harness.orchestrator;

        orchestrator.init("api", false).await.expect("init");
        assert_eq!(harness.stored().await, Manifest::new("api"));

        orchestrator
            .set_host("ubuntu", "203.0.113.5", "/key.pem")
            .await
            .expect("set_host");
        let host = harness.stored().await.host.expect("host persisted");
        assert_eq!(host.destination(), "ubuntu@203.0.113.5");

        orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect("first deploy");
        let first = harness.stored().await;
        let port = first.container_port.expect("port persisted");
        assert!(PORT_RANGE.contains(&port));
        assert_eq!(first.domain_name.as_deref(), Some("api.example.com"));
        assert_eq!(first.image.as_deref(), Some("org/api:1.0"));
        assert_eq!(first.stage(), ManifestStage::Deployed);

        orchestrator
            .deploy(&deploy_options(None, Some("org/api:2.0")))
            .await
            .expect("second deploy");
        let second = harness.stored().await;
        assert_eq!(second.container_port, Some(port));
        assert_eq!(second.domain_name.as_deref(), Some("api.example.com"));
        assert_eq!(second.image.as_deref(), Some("org/api:2.0"));

        let calls = harness.calls();
        assert_eq!(calls.connects, 2);
        assert_eq!(calls.closes, 2);
        assert_eq!(calls.transfers.len(), 2);
        assert_eq!(calls.transfers[0].1, "/tmp/add_bead_to_server.py");
        assert!(calls.transfers[0].0.ends_with(SCRIPT_NAME));
    }

    #[tokio::test]
    async fn test_deploy_command_arguments() {
        let harness = Harness::with_host(Behaviour::default()).await;
        harness
            .orchestrator
            .deploy(&DeployOptions {
                container_port: Some(8080),
                ..deploy_options(Some("api.example.com"), Some("org/api:1.0"))
            })
            .await
            .expect("deploy");

        let calls = harness.calls();
        assert_eq!(calls.commands.len(), 1);
        assert_eq!(
            calls.commands[0].to_string(),
            "sudo python3 /tmp/add_bead_to_server.py --service-name api \
             --domain-name api.example.com --container-port 8080 --image org/api:1.0"
        );
    }

    #[tokio::test]
    async fn test_missing_domain_makes_no_remote_calls() {
        let harness = Harness::with_host(Behaviour::default()).await;

        let err = harness
            .orchestrator
            .deploy(&deploy_options(None, Some("org/api:1.0")))
            .await
            .expect_err("deploy without domain");
        assert!(matches!(
            err,
            BeadError::Validation(ValidationError::MissingField { ref field }) if field == "domain_name"
        ));

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("")))
            .await
            .expect_err("deploy with empty image");
        assert!(matches!(err, BeadError::Validation(_)));

        let calls = harness.calls();
        assert_eq!(calls.connects, 0);
        assert!(calls.transfers.is_empty());
        assert!(calls.commands.is_empty());
        assert_eq!(harness.stored().await.container_port, None);
    }

    #[tokio::test]
    async fn test_port_override_out_of_range_is_rejected_before_connecting() {
        let harness = Harness::with_host(Behaviour::default()).await;

        let err = harness
            .orchestrator
            .deploy(&DeployOptions {
                container_port: Some(80),
                ..deploy_options(Some("api.example.com"), Some("org/api:1.0"))
            })
            .await
            .expect_err("privileged port accepted");

        assert!(matches!(
            err,
            BeadError::Validation(ValidationError::PortOutOfRange { port: 80 })
        ));
        assert_eq!(harness.calls().connects, 0);
    }

    #[tokio::test]
    async fn test_port_override_replaces_stored_port() {
        let harness = Harness::with_host(Behaviour::default()).await;
        let options = deploy_options(Some("api.example.com"), Some("org/api:1.0"));

        harness.orchestrator.deploy(&options).await.expect("deploy");
        harness
            .orchestrator
            .deploy(&DeployOptions {
                container_port: Some(9000),
                ..options
            })
            .await
            .expect("redeploy");

        assert_eq!(harness.stored().await.container_port, Some(9000));
    }

    #[tokio::test]
    async fn test_execute_error_still_closes_and_keeps_manifest() {
        let harness = Harness::with_host(Behaviour {
            execute_fails: true,
            ..Behaviour::default()
        })
        .await;

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect_err("failing execute");

        assert!(matches!(err, BeadError::RemoteCommand(_)));
        assert_eq!(harness.calls().closes, 1);
        let stored = harness.stored().await;
        assert_eq!(stored.container_port, None);
        assert_eq!(stored.domain_name, None);
    }

    #[tokio::test]
    async fn test_non_zero_exit_fails_deploy() {
        let harness = Harness::with_host(Behaviour {
            exit_code: 2,
            ..Behaviour::default()
        })
        .await;

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect_err("non-zero exit");

        assert!(matches!(
            err,
            BeadError::RemoteCommand(RemoteCommandError::NonZeroExit { code: Some(2), .. })
        ));
        assert_eq!(harness.calls().closes, 1);
        assert_eq!(harness.stored().await.image, None);
    }

    #[tokio::test]
    async fn test_connect_failure_aborts_before_commands() {
        let harness = Harness::with_host(Behaviour {
            connect_fails: true,
            ..Behaviour::default()
        })
        .await;

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect_err("unreachable host");

        assert!(matches!(err, BeadError::Connection(_)));
        let calls = harness.calls();
        assert_eq!(calls.connects, 1);
        assert!(calls.transfers.is_empty());
        assert!(calls.commands.is_empty());
        assert_eq!(calls.closes, 0);
    }

    #[tokio::test]
    async fn test_missing_script_fails_transfer_and_closes() {
        let harness = Harness::with_host(Behaviour::default()).await;
        std::fs::remove_file(harness.temp.path().join("scripts").join(SCRIPT_NAME))
            .expect("remove script");

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect_err("missing script");

        assert!(matches!(
            err,
            BeadError::Transfer(crate::error::TransferError::LocalFileNotFound { .. })
        ));
        let calls = harness.calls();
        assert!(calls.commands.is_empty());
        assert_eq!(calls.closes, 1);
    }

    #[tokio::test]
    async fn test_env_file_content_is_sent_as_secret_argument() {
        let harness = Harness::with_host(Behaviour::default()).await;
        let env_path = harness.temp.path().join("prod.env");
        std::fs::write(&env_path, "API_KEY=hunter2\n").expect("env file");

        harness
            .orchestrator
            .deploy(&DeployOptions {
                env_file: Some(env_path.clone()),
                ..deploy_options(Some("api.example.com"), Some("org/api:1.0"))
            })
            .await
            .expect("deploy");

        {
            let calls = harness.calls();
            let command = &calls.commands[0];
            let args: Vec<_> = command.arg_values().collect();
            assert_eq!(args[args.len() - 2], "--env-file-content");
            assert_eq!(args[args.len() - 1], "API_KEY=hunter2\n");
            assert!(!command.to_string().contains("hunter2"));
        }
        assert_eq!(harness.stored().await.env_file, Some(env_path));
    }

    #[tokio::test]
    async fn test_missing_env_file_deploys_without_content() {
        let harness = Harness::with_host(Behaviour::default()).await;

        harness
            .orchestrator
            .deploy(&DeployOptions {
                env_file: Some(harness.temp.path().join("absent.env")),
                ..deploy_options(Some("api.example.com"), Some("org/api:1.0"))
            })
            .await
            .expect("deploy");

        let calls = harness.calls();
        assert!(!calls.commands[0]
            .arg_values()
            .any(|a| a == "--env-file-content"));
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite_unless_forced() {
        let harness = Harness::with_host(Behaviour::default()).await;

        let err = harness
            .orchestrator
            .init("web", false)
            .await
            .expect_err("second init");
        assert!(matches!(
            err,
            BeadError::Manifest(ManifestError::AlreadyExists { .. })
        ));
        assert!(harness.stored().await.host.is_some());

        harness.orchestrator.init("web", true).await.expect("forced init");
        assert_eq!(harness.stored().await, Manifest::new("web"));
    }

    #[tokio::test]
    async fn test_init_rejects_bad_name() {
        let harness = Harness::new(Behaviour::default());
        assert!(harness.orchestrator.init("", false).await.is_err());
        assert!(harness.orchestrator.init("My Api", false).await.is_err());
        assert!(!harness.orchestrator.store().exists().await.expect("exists"));
    }

    #[tokio::test]
    async fn test_mixed_case_service_name_deploys_and_runs() {
        let harness = Harness::new(Behaviour::default());
        harness.orchestrator.init("My_API", false).await.expect("init");
        harness
            .orchestrator
            .set_host("ubuntu", "203.0.113.5", "/key.pem")
            .await
            .expect("set_host");

        harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect("deploy");
        harness.orchestrator.run().await.expect("run");

        let calls = harness.calls();
        assert!(calls.commands[0].arg_values().any(|a| a == "My_API"));
        assert_eq!(
            calls.commands[1].to_string(),
            "docker-compose -f /beads/My_API.yml up -d"
        );
    }

    #[tokio::test]
    async fn test_stored_name_is_not_revalidated_on_deploy() {
        let harness = Harness::new(Behaviour::default());
        std::fs::write(
            harness.orchestrator.store().location(),
            r#"{"service_name":"MyService.v2","host":{"username":"ubuntu","ip":"203.0.113.5","ssh_key_file":"/key.pem"},"container_port":null,"domain_name":null,"env_file":null,"image":null}"#,
        )
        .expect("write manifest");

        let manifest = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect("deploy");

        assert_eq!(manifest.service_name(), "MyService.v2");
        assert_eq!(harness.stored().await.stage(), ManifestStage::Deployed);
    }

    #[tokio::test]
    async fn test_operations_require_manifest() {
        let harness = Harness::new(Behaviour::default());
        let orchestrator = &harness.orchestrator;

        let missing = |r: Result<()>| {
            matches!(r, Err(BeadError::Manifest(ManifestError::Missing { .. })))
        };
        assert!(missing(
            orchestrator
                .set_host("ubuntu", "203.0.113.5", "/key.pem")
                .await
                .map(drop)
        ));
        assert!(missing(orchestrator.deploy(&DeployOptions::default()).await.map(drop)));
        assert!(missing(orchestrator.obtain_ssl_certificate().await));
        assert!(missing(orchestrator.run().await.map(drop)));
        assert!(missing(orchestrator.show().await.map(drop)));
        assert_eq!(harness.calls().connects, 0);
    }

    #[tokio::test]
    async fn test_deploy_requires_host() {
        let harness = Harness::new(Behaviour::default());
        harness.orchestrator.init("api", false).await.expect("init");

        let err = harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect_err("deploy without host");
        assert!(matches!(
            err,
            BeadError::Validation(ValidationError::HostNotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_certificate_uses_stored_domain() {
        let harness = Harness::with_host(Behaviour::default()).await;
        harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect("deploy");

        harness
            .orchestrator
            .obtain_ssl_certificate()
            .await
            .expect("certificate");

        let calls = harness.calls();
        assert_eq!(
            calls.commands.last().map(ToString::to_string).as_deref(),
            Some("sudo certbot --nginx -d api.example.com")
        );
        assert_eq!(calls.connects, 2);
        assert_eq!(calls.closes, 2);
    }

    #[tokio::test]
    async fn test_certificate_without_domain_does_not_connect() {
        let harness = Harness::with_host(Behaviour::default()).await;

        assert!(harness.orchestrator.obtain_ssl_certificate().await.is_err());
        assert_eq!(harness.calls().connects, 0);
    }

    #[tokio::test]
    async fn test_run_substitutes_service_name_and_reloads_proxy() {
        let harness = Harness::with_host(Behaviour::default()).await;
        harness
            .orchestrator
            .deploy(&deploy_options(Some("api.example.com"), Some("org/api:1.0")))
            .await
            .expect("deploy");

        let url = harness.orchestrator.run().await.expect("run");
        assert_eq!(url, "http://api.example.com");

        let calls = harness.calls();
        let shown: Vec<_> = calls.commands[1..].iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec![
                "docker-compose -f /beads/api.yml up -d",
                "sudo systemctl reload nginx",
            ]
        );
        assert_eq!(calls.connects, 2);
        assert_eq!(calls.closes, 2);
    }

    #[tokio::test]
    async fn test_run_stops_after_failed_compose_and_closes() {
        let harness = Harness::with_host(Behaviour {
            exit_code: 1,
            ..Behaviour::default()
        })
        .await;
        let mut manifest = harness.stored().await;
        manifest.container_port = Some(8080);
        manifest.domain_name = Some(String::from("api.example.com"));
        manifest.image = Some(String::from("org/api:1.0"));
        harness.orchestrator.store().save(&manifest).await.expect("save");

        let err = harness.orchestrator.run().await.expect_err("failing compose");

        assert!(matches!(
            err,
            BeadError::RemoteCommand(RemoteCommandError::NonZeroExit { code: Some(1), .. })
        ));
        let calls = harness.calls();
        assert_eq!(calls.commands.len(), 1);
        assert_eq!(calls.closes, 1);
    }

    #[tokio::test]
    async fn test_run_requires_deploy() {
        let harness = Harness::with_host(Behaviour::default()).await;

        assert!(harness.orchestrator.run().await.is_err());
        assert_eq!(harness.calls().connects, 0);
    }

    #[test]
    fn test_prefer() {
        assert_eq!(prefer(Some("new"), Some("old")), Some("new"));
        assert_eq!(prefer(Some(""), Some("old")), Some("old"));
        assert_eq!(prefer(None, Some("old")), Some("old"));
        assert_eq!(prefer(None, None), None);
    }
}
