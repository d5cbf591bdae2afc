//! Administrative command surface of the supervised service.
//!
//! [`ProcessAdmin`] implements [`AdminCommand`] by running the service's admin
//! binary. Tests substitute doubles that record invocations without spawning
//! anything.

use std::ffi::OsString;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use tracing::debug;

use super::PROVISION_TARGET;
use super::error::ProvisioningError;

/// The two administrative operations the harness needs.
pub trait AdminCommand {
    /// Registers a principal for `address` and returns the command's stdout.
    fn add(&self, address: &str) -> Result<String, ProvisioningError>;

    /// Removes the principal with `principal_id`.
    fn remove(&self, principal_id: &str) -> Result<(), ProvisioningError>;
}

/// Runs `<binary> add <address>` and `<binary> remove <id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessAdmin {
    binary: OsString,
}

impl ProcessAdmin {
    /// Creates an admin runner for `binary`.
    pub fn new(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, operation: &'static str, argument: &str) -> Result<Output, ProvisioningError> {
        debug!(
            target: PROVISION_TARGET,
            binary = %self.binary.to_string_lossy(),
            operation,
            "running admin command"
        );
        let output = Command::new(&self.binary)
            .arg(operation)
            .arg(argument)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProvisioningError::Spawn {
                binary: self.binary.clone(),
                operation,
                source: Arc::new(source),
            })?;
        if output.status.success() {
            return Ok(output);
        }
        Err(ProvisioningError::NonZeroExit {
            operation,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

impl AdminCommand for ProcessAdmin {
    fn add(&self, address: &str) -> Result<String, ProvisioningError> {
        let output = self.run("add", address)?;
        String::from_utf8(output.stdout)
            .map_err(|_| ProvisioningError::InvalidOutput { operation: "add" })
    }

    fn remove(&self, principal_id: &str) -> Result<(), ProvisioningError> {
        self.run("remove", principal_id).map(drop)
    }
}
