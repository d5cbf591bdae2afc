//! Streaming pass/fail report.

use std::io::{self, Write};
use std::process::ExitCode;

use crate::executor::{Outcome, TestResult};

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// ANSI sequences wrapping a marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Prefix for passing lines.
    pub pass: &'static str,
    /// Prefix for failing lines.
    pub fail: &'static str,
    /// Suffix resetting the terminal.
    pub reset: &'static str,
}

/// Markers and optional colours used by the [`Reporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    /// Marker printed before a passing case.
    pub pass_marker: &'static str,
    /// Marker printed before a failing case.
    pub fail_marker: &'static str,
    /// Colours, when enabled.
    pub palette: Option<Palette>,
}

impl ReportStyle {
    /// Default markers, coloured green and red when `color` is set.
    #[must_use]
    pub const fn colored(color: bool) -> Self {
        Self {
            pass_marker: "✓",
            fail_marker: "✘",
            palette: if color {
                Some(Palette {
                    pass: GREEN,
                    fail: RED,
                    reset: RESET,
                })
            } else {
                None
            },
        }
    }
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self::colored(false)
    }
}

/// Accumulated verdicts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    results: Vec<TestResult>,
}

impl Report {
    /// Results in execution order.
    #[must_use]
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Number of passing cases.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|result| result.passed).count()
    }

    /// Number of failing cases.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// Success only when no case failed.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.failed() == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Writes each result as it arrives and keeps it for the summary.
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    style: ReportStyle,
    report: Report,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `out`.
    pub fn new(out: W, style: ReportStyle) -> Self {
        Self {
            out,
            style,
            report: Report::default(),
        }
    }

    /// Prints `result` and records it.
    ///
    /// Failing results are followed by the status code and body, or by the
    /// error that prevented a response.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn record(&mut self, result: TestResult) -> io::Result<()> {
        let (marker, color) = if result.passed {
            (self.style.pass_marker, self.style.palette.map(|p| p.pass))
        } else {
            (self.style.fail_marker, self.style.palette.map(|p| p.fail))
        };
        let reset = self.style.palette.map_or("", |p| p.reset);
        writeln!(
            self.out,
            "{}{marker} {}{reset}",
            color.unwrap_or(""),
            result.name
        )?;
        if !result.passed {
            match &result.outcome {
                Outcome::Response { status, body } => {
                    writeln!(self.out, "=> Status code: {status}")?;
                    writeln!(self.out, "=> Response body: {body}")?;
                }
                Outcome::TransportFailure(message) => {
                    writeln!(self.out, "=> Transport error: {message}")?;
                }
                Outcome::InvalidDirective(message) => {
                    writeln!(self.out, "=> Invalid directive: {message}")?;
                }
                Outcome::UnreadableScript(message) => {
                    writeln!(self.out, "=> Unreadable script: {message}")?;
                }
            }
        }
        self.out.flush()?;
        self.report.results.push(result);
        Ok(())
    }

    /// Prints the summary line and returns the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the output fails.
    pub fn finish(mut self) -> io::Result<Report> {
        writeln!(
            self.out,
            "{} passed, {} failed",
            self.report.passed(),
            self.report.failed()
        )?;
        self.out.flush()?;
        Ok(self.report)
    }
}
