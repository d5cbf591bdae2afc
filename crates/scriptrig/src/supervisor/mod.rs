//! Lifecycle management for the supervised service process.
//!
//! The module is split into focused submodules:
//! - [`spawning`] launches the process without waiting on it.
//! - [`readiness`] polls the liveness endpoint through an explicit state
//!   machine.
//! - [`shutdown`] signals and reaps the process.
//! - [`handle`] owns the child and stops it when dropped.
//! - [`error`] captures the error surface.

use std::time::Duration;

mod error;
mod handle;
mod readiness;
mod shutdown;
mod spawning;

pub use error::SupervisorError;
pub use handle::ServerHandle;
pub use readiness::{
    HttpProbe, LivenessProbe, ProbeOutcome, ReadinessEvent, ReadinessPolicy, ReadinessState,
    await_ready,
};
pub use shutdown::stop;
pub use spawning::{ServerCommand, start};

pub(crate) const SUPERVISOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::supervisor");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
