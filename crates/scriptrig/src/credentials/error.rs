//! Errors raised while adding or removing the ephemeral principal.

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use thiserror::Error;

/// Errors arising from the administrative command surface.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// The administrative binary could not be executed.
    #[error("failed to run admin binary '{binary:?}' for '{operation}': {source}")]
    Spawn {
        /// Binary that failed to start.
        binary: OsString,
        /// Admin operation being attempted.
        operation: &'static str,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The administrative command exited unsuccessfully.
    #[error("admin '{operation}' exited with status {status:?}: {stderr}")]
    NonZeroExit {
        /// Admin operation being attempted.
        operation: &'static str,
        /// Exit code, if the process was not killed by a signal.
        status: Option<i32>,
        /// Trimmed standard error of the command.
        stderr: String,
    },

    /// A required field was missing from the `add` output.
    ///
    /// The principal may still have been created server-side.
    #[error("admin 'add' output for '{address}' is missing the {field} line")]
    MissingField {
        /// Human-readable field name.
        field: &'static str,
        /// Address the principal was requested for.
        address: String,
    },

    /// The administrative command wrote non-UTF-8 output.
    #[error("admin '{operation}' wrote non-UTF-8 output")]
    InvalidOutput {
        /// Admin operation being attempted.
        operation: &'static str,
    },
}
