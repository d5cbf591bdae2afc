//! Service termination.
//!
//! The service first receives SIGTERM so it can exit cleanly. If it is still
//! alive once the grace period lapses it is killed outright. Either way the
//! child is reaped before [`stop`] returns.

use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::error::SupervisorError;
use super::handle::ServerHandle;
use super::{SHUTDOWN_GRACE, SUPERVISOR_TARGET};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Terminates and reaps the service process.
///
/// Idempotent: only the first call on a handle does any work. The handle is
/// marked stopped before signalling so a failure here is never retried from
/// `Drop`.
///
/// # Errors
///
/// Returns an error if the process cannot be signalled or killed, or if it
/// cannot be reaped once killed.
pub fn stop(handle: &mut ServerHandle) -> Result<(), SupervisorError> {
    if handle.stopped {
        return Ok(());
    }
    handle.stopped = true;
    let pid = handle.child.id();
    match escalation(handle.poll_exit()) {
        Escalation::Exited(status) => {
            debug!(target: SUPERVISOR_TARGET, pid, %status, "service already exited");
            return Ok(());
        }
        Escalation::Kill(error) => {
            warn!(
                target: SUPERVISOR_TARGET,
                pid,
                error = %error,
                "cannot observe service; killing"
            );
            return kill_and_reap(&mut handle.child);
        }
        Escalation::Terminate => {}
    }
    if let Err(error) = request_termination(&mut handle.child) {
        warn!(
            target: SUPERVISOR_TARGET,
            pid,
            error = %error,
            "termination signal failed; killing service"
        );
        return kill_and_reap(&mut handle.child);
    }
    match wait_with_grace(&mut handle.child, SHUTDOWN_GRACE) {
        Ok(Some(status)) => {
            info!(target: SUPERVISOR_TARGET, pid, %status, "service stopped");
            Ok(())
        }
        Err(error) => {
            warn!(
                target: SUPERVISOR_TARGET,
                pid,
                error = %error,
                "lost track of service during grace period; killing"
            );
            kill_and_reap(&mut handle.child)
        }
        Ok(None) => {
            warn!(
                target: SUPERVISOR_TARGET,
                pid,
                grace_ms = u64::try_from(SHUTDOWN_GRACE.as_millis()).unwrap_or(u64::MAX),
                "service ignored termination signal; killing"
            );
            kill_and_reap(&mut handle.child)
        }
    }
}

/// First step of [`stop`], chosen from an exit check on the child.
#[derive(Debug)]
pub(super) enum Escalation {
    Exited(ExitStatus),
    Terminate,
    /// The child could not be observed, so it is killed without a grace period.
    Kill(SupervisorError),
}

pub(super) fn escalation(observed: Result<Option<ExitStatus>, SupervisorError>) -> Escalation {
    match observed {
        Ok(Some(status)) => Escalation::Exited(status),
        Ok(None) => Escalation::Terminate,
        Err(error) => Escalation::Kill(error),
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child) -> Result<(), SupervisorError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let pid = child.id();
    let raw = i32::try_from(pid).map_err(|_| SupervisorError::Signal {
        pid,
        source: Errno::EINVAL,
    })?;
    match kill(Pid::from_raw(raw), Signal::SIGTERM) {
        // The process exited between the liveness check and the signal.
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(source) => Err(SupervisorError::Signal { pid, source }),
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child) -> Result<(), SupervisorError> {
    let pid = child.id();
    child
        .kill()
        .map_err(|source| SupervisorError::Kill { pid, source })
}

fn wait_with_grace(
    child: &mut Child,
    grace: Duration,
) -> Result<Option<ExitStatus>, SupervisorError> {
    let pid = child.id();
    let deadline = Instant::now() + grace;
    loop {
        if let Some(status) = child
            .try_wait()
            .map_err(|source| SupervisorError::MonitorChild { pid, source })?
        {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) -> Result<(), SupervisorError> {
    let pid = child.id();
    child
        .kill()
        .map_err(|source| SupervisorError::Kill { pid, source })?;
    let status = child
        .wait()
        .map_err(|source| SupervisorError::MonitorChild { pid, source })?;
    info!(target: SUPERVISOR_TARGET, pid, %status, "service killed");
    Ok(())
}
