//! Integration-test harness for script-executing services.
//!
//! A run supervises the service binary, provisions an ephemeral principal
//! through the service's admin command, submits every script in the corpus
//! over HTTP, classifies each response against the expectation embedded in
//! the script, and reports the outcome with a CI-friendly exit code.
//!
//! The binary is a thin wrapper around [`run`]; the library exposes the
//! individual stages so they can be driven with substituted collaborators.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use scriptrig_config::Config;

mod cli;
mod config;
pub mod credentials;
pub mod discovery;
mod errors;
pub mod executor;
pub mod expectation;
pub mod harness;
mod interrupt;
pub mod report;
pub mod supervisor;
pub mod telemetry;


use cli::Cli;
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use harness::SystemHarness;
pub use interrupt::Interrupt;
use report::{ReportStyle, Reporter};

/// Bundles the output streams handed to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
    stdout_is_terminal: bool,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E, stdout_is_terminal: bool) -> Self {
        Self {
            stdout,
            stderr,
            stdout_is_terminal,
        }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let result = Cli::try_parse_from(cli_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| self.execute(&cli, &config));

        match result {
            Ok(exit_code) => exit_code,
            // Help and version output are requested, not errors.
            Err(AppError::CliUsage(error)) if !error.use_stderr() => {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&mut self, cli: &Cli, config: &Config) -> Result<ExitCode, AppError> {
        telemetry::initialise(config)?;
        let interrupt = Interrupt::install().map_err(AppError::Signals)?;
        let harness =
            SystemHarness::from_config(config, cli.pattern.as_deref())?.with_interrupt(interrupt);
        let style = ReportStyle::colored(config.color().enabled(self.io.stdout_is_terminal));
        let report = harness.run(Reporter::new(&mut *self.io.stdout, style))?;
        Ok(report.exit_code())
    }
}

/// Runs the harness with the given arguments and output streams.
///
/// The exit code is success only when every script passed.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E, stdout_is_terminal: bool) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr, stdout_is_terminal);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}
