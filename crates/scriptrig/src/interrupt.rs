//! Cooperative interruption flag shared by the readiness and test loops.
//!
//! SIGINT and SIGTERM flip the flag instead of killing the harness outright,
//! so the loops can stop at their next check and the guards still remove the
//! principal and terminate the service.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use tracing::debug;

const INTERRUPT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::interrupt");

/// Shared flag set when the operator asks the harness to stop.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Returns a flag that is never raised by signals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a flag wired to SIGINT and SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when a signal handler cannot be
    /// registered.
    pub fn install() -> io::Result<Self> {
        let interrupt = Self::new();
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&interrupt.flag))?;
        }
        debug!(target: INTERRUPT_TARGET, "installed interrupt handlers");
        Ok(interrupt)
    }

    /// Raises the flag.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Reports whether the flag has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
