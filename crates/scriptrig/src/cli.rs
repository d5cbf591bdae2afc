//! Command-line arguments that are not configuration.

use clap::Parser;

/// Runs script test cases against a supervised service.
///
/// Configuration flags such as `--script-dir` must precede the pattern.
#[derive(Parser, Debug)]
#[command(name = "scriptrig", version)]
pub(crate) struct Cli {
    /// Glob selecting scripts inside the script directory.
    #[arg(value_name = "PATTERN")]
    pub(crate) pattern: Option<String>,
}
