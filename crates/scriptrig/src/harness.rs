//! End-to-end orchestration of a harness run.
//!
//! A run starts the service and waits for readiness, provisions a principal,
//! executes every discovered script, then removes the principal and stops the
//! service in that order. The server handle and credential guard are held in
//! nested scopes so both are released on every exit path, including panics.

use std::io::{self, Write};

use scriptrig_config::Config;
use thiserror::Error;
use tracing::{info, warn};

use crate::Interrupt;
use crate::credentials::{
    AdminCommand, Credential, CredentialProvisioner, IdentityGenerator, ProcessAdmin,
    ProvisioningError, RandomIdentity,
};
use crate::discovery::{Corpus, DiscoveryError};
use crate::executor::{HttpTransport, ScriptTransport, TestExecutor, TransportError};
use crate::report::{Report, Reporter};
use crate::supervisor::{
    HttpProbe, LivenessProbe, ReadinessPolicy, ServerCommand, SupervisorError, await_ready, start,
    stop,
};

const HARNESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::harness");

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The service could not be started or never became ready.
    #[error("service supervision failed: {0}")]
    Supervisor(#[source] SupervisorError),
    /// The principal could not be created.
    #[error("failed to provision principal: {0}")]
    Provisioning(#[from] ProvisioningError),
    /// The script transport could not be constructed.
    #[error("failed to prepare script transport: {0}")]
    Transport(#[from] TransportError),
    /// The script corpus could not be loaded.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The report could not be written.
    #[error("failed to write report: {0}")]
    Report(#[source] io::Error),
    /// The principal could not be removed after the run.
    #[error("failed to remove principal '{principal_id}': {source}")]
    RemovePrincipal {
        /// Principal left behind on the service.
        principal_id: String,
        /// Admin failure.
        #[source]
        source: ProvisioningError,
    },
    /// The service could not be stopped after the run.
    #[error("failed to stop service: {0}")]
    StopServer(#[source] SupervisorError),
    /// The operator interrupted the run.
    #[error("run interrupted")]
    Interrupted,
}

impl From<SupervisorError> for HarnessError {
    fn from(error: SupervisorError) -> Self {
        match error {
            SupervisorError::Interrupted => Self::Interrupted,
            other => Self::Supervisor(other),
        }
    }
}

/// Harness wired to the real service, admin binary, and HTTP endpoint.
pub type SystemHarness = Harness<HttpProbe, ProcessAdmin, RandomIdentity, HttpTransport>;

/// Collaborators for one run.
#[derive(Debug)]
pub struct Harness<P, A, I, T> {
    server: ServerCommand,
    probe: P,
    readiness: ReadinessPolicy,
    provisioner: CredentialProvisioner<A, I>,
    executor: TestExecutor<T>,
    corpus: Corpus,
    interrupt: Interrupt,
}

impl SystemHarness {
    /// Builds a harness from configuration.
    ///
    /// `pattern` overrides the configured default glob.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: &Config, pattern: Option<&str>) -> Result<Self, HarnessError> {
        let probe = HttpProbe::new(config.service_url.clone(), config.probe_timeout())?;
        let transport = HttpTransport::new(config.script_url(), config.request_timeout())?;
        let provisioner = CredentialProvisioner::new(
            ProcessAdmin::new(&config.admin_binary),
            RandomIdentity,
            config.identity_prefix.clone(),
            config.identity_domain.clone(),
        );
        Ok(Self::new(
            ServerCommand::new(&config.server_binary),
            probe,
            ReadinessPolicy {
                ready_status: config.ready_status,
                poll_interval: config.poll_interval(),
                timeout: config.startup_timeout(),
            },
            provisioner,
            TestExecutor::new(transport, config.placeholder_token.clone()),
            Corpus::new(
                config.script_dir(),
                pattern.unwrap_or(&config.default_pattern),
            ),
        ))
    }
}

impl<P, A, I, T> Harness<P, A, I, T>
where
    P: LivenessProbe,
    A: AdminCommand,
    I: IdentityGenerator,
    T: ScriptTransport,
{
    /// Assembles a harness from its collaborators.
    pub fn new(
        server: ServerCommand,
        probe: P,
        readiness: ReadinessPolicy,
        provisioner: CredentialProvisioner<A, I>,
        executor: TestExecutor<T>,
        corpus: Corpus,
    ) -> Self {
        Self {
            server,
            probe,
            readiness,
            provisioner,
            executor,
            corpus,
            interrupt: Interrupt::new(),
        }
    }

    /// Uses `interrupt` to stop the run early.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Executes the whole run, streaming results into `reporter`.
    ///
    /// Failing test cases do not make this return an error; inspect the
    /// returned [`Report`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error when the service cannot be started, the principal
    /// cannot be provisioned or removed, the corpus cannot be loaded, the
    /// report cannot be written, the service cannot be stopped, or the run is
    /// interrupted.
    pub fn run<W: Write>(&self, reporter: Reporter<W>) -> Result<Report, HarnessError> {
        let mut server = start(&self.server)?;
        await_ready(&mut server, &self.probe, self.readiness, &self.interrupt)?;

        let outcome = self.run_with_server(reporter);
        let stopped = stop(&mut server).map_err(HarnessError::StopServer);
        match (outcome, stopped) {
            (Ok(report), Ok(())) => Ok(report),
            (Err(error), Ok(())) | (Ok(_), Err(error)) => Err(error),
            (Err(error), Err(teardown)) => {
                warn!(target: HARNESS_TARGET, error = %teardown, "teardown also failed");
                Err(error)
            }
        }
    }

    fn run_with_server<W: Write>(&self, reporter: Reporter<W>) -> Result<Report, HarnessError> {
        let guard = self.provisioner.acquire()?;
        let outcome = self.run_cases(guard.credential(), reporter);
        let principal_id = guard.credential().principal_id().to_owned();
        let released = guard
            .release()
            .map_err(|source| HarnessError::RemovePrincipal {
                principal_id,
                source,
            });
        match (outcome, released) {
            (Ok(report), Ok(())) => Ok(report),
            (Err(error), Ok(())) | (Ok(_), Err(error)) => Err(error),
            (Err(error), Err(teardown)) => {
                warn!(target: HARNESS_TARGET, error = %teardown, "teardown also failed");
                Err(error)
            }
        }
    }

    fn run_cases<W: Write>(
        &self,
        credential: &Credential,
        mut reporter: Reporter<W>,
    ) -> Result<Report, HarnessError> {
        let cases = self.corpus.discover()?;
        info!(target: HARNESS_TARGET, count = cases.len(), "running scripts");
        for case in &cases {
            if self.interrupt.is_raised() {
                warn!(target: HARNESS_TARGET, next = case.name(), "run interrupted");
                return Err(HarnessError::Interrupted);
            }
            let result = self.executor.execute(case, credential);
            reporter.record(result).map_err(HarnessError::Report)?;
        }
        let report = reporter.finish().map_err(HarnessError::Report)?;
        info!(
            target: HARNESS_TARGET,
            passed = report.passed(),
            failed = report.failed(),
            "run complete"
        );
        Ok(report)
    }
}
