//! Error types for supervising the service process.

use std::ffi::OsString;
use std::io;

use thiserror::Error;

/// Errors raised while starting, monitoring, or stopping the service.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("failed to spawn service binary '{program:?}': {source}")]
    Launch {
        program: OsString,
        #[source]
        source: io::Error,
    },
    #[error("service exited before reporting ready (status: {exit_status:?})")]
    StartupFailure { exit_status: Option<i32> },
    #[error("timed out waiting for the service to become ready after {timeout_ms} ms")]
    StartupTimeout { timeout_ms: u64 },
    #[error("interrupted while waiting for the service to become ready")]
    Interrupted,
    #[error("failed to monitor service process {pid}: {source}")]
    MonitorChild {
        pid: u32,
        #[source]
        source: io::Error,
    },
    #[error("failed to build the liveness probe client: {source}")]
    ProbeClient {
        #[source]
        source: reqwest::Error,
    },
    #[cfg(unix)]
    #[error("failed to signal service pid {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: nix::errno::Errno,
    },
    #[error("failed to kill service pid {pid}: {source}")]
    Kill {
        pid: u32,
        #[source]
        source: io::Error,
    },
}
