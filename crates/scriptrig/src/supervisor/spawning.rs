//! Service process spawning.

use std::ffi::{OsStr, OsString};
use std::process::{Command, Stdio};

use tracing::info;

use super::SUPERVISOR_TARGET;
use super::error::SupervisorError;
use super::handle::ServerHandle;

/// Program and arguments used to launch the supervised service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ServerCommand {
    /// Creates a command for `program` with no arguments.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program to execute.
    pub fn program(&self) -> &OsStr {
        &self.program
    }
}

/// Spawns the service without waiting for it to become ready.
///
/// Standard output and error are inherited so service diagnostics land next
/// to the harness report.
pub fn start(command: &ServerCommand) -> Result<ServerHandle, SupervisorError> {
    let child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| SupervisorError::Launch {
            program: command.program.clone(),
            source,
        })?;
    info!(
        target: SUPERVISOR_TARGET,
        pid = child.id(),
        program = %command.program.to_string_lossy(),
        "spawned service process"
    );
    Ok(ServerHandle::new(child))
}
