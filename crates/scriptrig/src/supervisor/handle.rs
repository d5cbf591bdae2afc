//! Owned handle to the supervised service process.

use std::process::{Child, ExitStatus};

use tracing::warn;

use super::SUPERVISOR_TARGET;
use super::error::SupervisorError;
use super::readiness::{ReadinessEvent, ReadinessState};
use super::shutdown::stop;

/// Handle to the running service plus its readiness state.
///
/// Dropping the handle stops the process, so termination runs on every exit
/// path of the owning scope. [`stop`] may also be called explicitly to observe
/// errors; the drop then becomes a no-op.
#[derive(Debug)]
pub struct ServerHandle {
    pub(super) child: Child,
    state: ReadinessState,
    pub(super) stopped: bool,
}

impl ServerHandle {
    pub(super) fn new(child: Child) -> Self {
        Self {
            child,
            state: ReadinessState::Starting,
            stopped: false,
        }
    }

    /// Process id of the service.
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Current readiness state.
    #[must_use]
    pub const fn state(&self) -> ReadinessState {
        self.state
    }

    /// Whether [`stop`] has already run for this handle.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(super) fn advance(&mut self, event: ReadinessEvent) -> ReadinessState {
        self.state = self.state.on(event);
        self.state
    }

    pub(super) fn poll_exit(&mut self) -> Result<Option<ExitStatus>, SupervisorError> {
        let pid = self.child.id();
        self.child
            .try_wait()
            .map_err(|source| SupervisorError::MonitorChild { pid, source })
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        if let Err(error) = stop(self) {
            warn!(
                target: SUPERVISOR_TARGET,
                pid = self.child.id(),
                error = %error,
                "failed to stop service process"
            );
        }
    }
}
