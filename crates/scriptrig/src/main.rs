//! Binary entrypoint for the scriptrig harness.

use std::io::{self, IsTerminal, Stderr, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdout_is_terminal = io::stdout().is_terminal();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    // Left unlocked: tracing writes to stderr from the HTTP client's threads.
    let mut stderr: Stderr = io::stderr();
    scriptrig::run(
        std::env::args_os(),
        &mut stdout,
        &mut stderr,
        stdout_is_terminal,
    )
}
