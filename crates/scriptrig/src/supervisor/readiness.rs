//! Readiness detection for the supervised service.
//!
//! Readiness is modelled as a small state machine. [`await_ready`] feeds it
//! probe results, process-exit observations, the startup deadline, and
//! operator interrupts until it lands in [`ReadinessState::Ready`] or
//! [`ReadinessState::Failed`].

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::{debug, info};

use super::SUPERVISOR_TARGET;
use super::error::SupervisorError;
use super::handle::ServerHandle;
use crate::Interrupt;

/// Lifecycle of a service between spawn and first successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Spawned; no probe has completed yet.
    Starting,
    /// At least one probe completed without signalling readiness.
    Probing,
    /// The liveness endpoint answered with the ready status.
    Ready,
    /// The process exited, the deadline passed, or the run was interrupted.
    Failed,
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => f.write_str("starting"),
            Self::Probing => f.write_str("probing"),
            Self::Ready => f.write_str("ready"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// Observation fed into the readiness state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessEvent {
    /// The probe returned the ready status.
    ProbeReady,
    /// The probe was unreachable or returned another status.
    ProbeNotReady,
    /// The process exited with the given code.
    ProcessExited(Option<i32>),
    /// The startup deadline passed.
    DeadlineElapsed,
    /// The operator interrupted the run.
    Interrupted,
}

impl ReadinessState {
    /// Applies `event` and returns the next state.
    ///
    /// `Ready` and `Failed` are terminal and absorb every event.
    #[must_use]
    pub const fn on(self, event: ReadinessEvent) -> Self {
        match (self, event) {
            (Self::Ready | Self::Failed, _) => self,
            (_, ReadinessEvent::ProbeReady) => Self::Ready,
            (_, ReadinessEvent::ProbeNotReady) => Self::Probing,
            (
                _,
                ReadinessEvent::ProcessExited(_)
                | ReadinessEvent::DeadlineElapsed
                | ReadinessEvent::Interrupted,
            ) => Self::Failed,
        }
    }
}

/// Result of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The endpoint could not be reached.
    Unreachable,
    /// The endpoint answered with this HTTP status.
    Status(u16),
}

/// Unauthenticated liveness check against the service.
pub trait LivenessProbe {
    /// Performs one probe. Connectivity failures map to
    /// [`ProbeOutcome::Unreachable`] rather than an error.
    fn probe(&self) -> ProbeOutcome;
}

/// Probe issuing `GET` requests against the service URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    /// Builds a probe with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SupervisorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| SupervisorError::ProbeClient { source })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl LivenessProbe for HttpProbe {
    fn probe(&self) -> ProbeOutcome {
        match self.client.get(&self.url).send() {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(error) => {
                debug!(
                    target: SUPERVISOR_TARGET,
                    url = %self.url,
                    error = %error,
                    "liveness probe unreachable"
                );
                ProbeOutcome::Unreachable
            }
        }
    }
}

/// Tunables for [`await_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessPolicy {
    /// Status that marks the service as ready.
    pub ready_status: u16,
    /// Delay between probes.
    pub poll_interval: Duration,
    /// Upper bound on the whole wait.
    pub timeout: Duration,
}

/// Blocks until the service is ready.
///
/// Each cycle probes first. If the service is not ready, the process is
/// checked for an early exit, then the interrupt flag and the deadline, before
/// sleeping for the poll interval.
///
/// # Errors
///
/// Returns [`SupervisorError::StartupFailure`] once the process is seen to
/// have exited, [`SupervisorError::StartupTimeout`] when the deadline passes,
/// and [`SupervisorError::Interrupted`] when the interrupt flag is raised.
pub fn await_ready<P>(
    handle: &mut ServerHandle,
    probe: &P,
    policy: ReadinessPolicy,
    interrupt: &Interrupt,
) -> Result<(), SupervisorError>
where
    P: LivenessProbe + ?Sized,
{
    // A timeout too large to represent as an instant never elapses.
    let deadline = Instant::now().checked_add(policy.timeout);
    loop {
        let event = match probe.probe() {
            ProbeOutcome::Status(status) if status == policy.ready_status => {
                ReadinessEvent::ProbeReady
            }
            outcome => {
                debug!(target: SUPERVISOR_TARGET, ?outcome, "service not ready yet");
                ReadinessEvent::ProbeNotReady
            }
        };
        if handle.advance(event) == ReadinessState::Ready {
            info!(target: SUPERVISOR_TARGET, pid = handle.pid(), "service is ready");
            return Ok(());
        }
        if let Some(failure) = next_failure(handle, deadline, interrupt)? {
            handle.advance(failure);
            return Err(startup_error(failure, policy.timeout));
        }
        thread::sleep(policy.poll_interval);
    }
}

fn next_failure(
    handle: &mut ServerHandle,
    deadline: Option<Instant>,
    interrupt: &Interrupt,
) -> Result<Option<ReadinessEvent>, SupervisorError> {
    if let Some(status) = handle.poll_exit()? {
        return Ok(Some(ReadinessEvent::ProcessExited(status.code())));
    }
    if interrupt.is_raised() {
        return Ok(Some(ReadinessEvent::Interrupted));
    }
    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Ok(Some(ReadinessEvent::DeadlineElapsed));
    }
    Ok(None)
}

fn startup_error(event: ReadinessEvent, timeout: Duration) -> SupervisorError {
    match event {
        ReadinessEvent::ProcessExited(exit_status) => {
            SupervisorError::StartupFailure { exit_status }
        }
        ReadinessEvent::Interrupted => SupervisorError::Interrupted,
        ReadinessEvent::DeadlineElapsed
        | ReadinessEvent::ProbeReady
        | ReadinessEvent::ProbeNotReady => SupervisorError::StartupTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        },
    }
}
