//! Script corpus discovery.

use std::fs;
use std::io;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{GlobError, Pattern, PatternError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::expectation::{DirectiveError, Expectation};

const DISCOVERY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::discovery");

/// Errors raised while locating or reading scripts.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The glob pattern is malformed.
    #[error("invalid script pattern '{pattern}': {source}")]
    Pattern {
        /// Full pattern including the script directory.
        pattern: String,
        /// Parser failure.
        #[source]
        source: PatternError,
    },

    /// A directory entry could not be inspected while matching.
    #[error("failed to scan script directory: {source}")]
    Walk {
        /// Underlying glob error.
        #[source]
        source: GlobError,
    },

    /// A matched path is not valid UTF-8.
    #[error("script path {path:?} is not valid UTF-8")]
    NonUtf8Path {
        /// Offending path.
        path: PathBuf,
    },

}

/// Why a discovered script cannot be submitted.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The directive comment is malformed.
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    /// The file could not be read as UTF-8 text.
    #[error("failed to read script: {0}")]
    Unreadable(#[source] io::Error),
}

/// A script and the expectation derived from it.
#[derive(Debug)]
pub struct TestCase {
    path: Utf8PathBuf,
    raw_text: String,
    expectation: Result<Expectation, CaseError>,
}

impl TestCase {
    /// Builds a case from a script's path and contents.
    pub fn new(path: impl Into<Utf8PathBuf>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let expectation = Expectation::parse(&raw_text).map_err(CaseError::from);
        Self {
            path: path.into(),
            raw_text,
            expectation,
        }
    }

    /// Builds a case for a matched script whose contents could not be read.
    pub fn unreadable(path: impl Into<Utf8PathBuf>, error: io::Error) -> Self {
        Self {
            path: path.into(),
            raw_text: String::new(),
            expectation: Err(CaseError::Unreadable(error)),
        }
    }

    /// Path the script was loaded from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Name shown in the report.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.as_str()
    }

    /// Script text as stored on disk.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Expectation parsed from the directive comment.
    ///
    /// # Errors
    ///
    /// Returns the case error when the script could not be read or its
    /// `-- ok:` literal is not valid JSON.
    pub fn expectation(&self) -> Result<&Expectation, &CaseError> {
        self.expectation.as_ref()
    }
}

/// Script files under a directory that match a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    dir: Utf8PathBuf,
    pattern: String,
}

impl Corpus {
    /// Creates a corpus rooted at `dir`.
    pub fn new(dir: impl Into<Utf8PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Glob matched against the file system.
    #[must_use]
    pub fn full_pattern(&self) -> String {
        let dir = Pattern::escape(self.dir.as_str());
        Utf8Path::new(&dir).join(&self.pattern).into_string()
    }

    /// Loads every matching file in the order the glob yields them.
    ///
    /// Directories matching the pattern are skipped. An empty match is not an
    /// error. A script that cannot be read becomes a case carrying
    /// [`CaseError::Unreadable`] so the rest of the corpus still runs.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed pattern, an unreadable directory
    /// entry, or a non-UTF-8 path.
    pub fn discover(&self) -> Result<Vec<TestCase>, DiscoveryError> {
        let pattern = self.full_pattern();
        let paths = glob::glob(&pattern).map_err(|source| DiscoveryError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;
        let mut cases = Vec::new();
        for entry in paths {
            let path = entry.map_err(|source| DiscoveryError::Walk { source })?;
            let path = Utf8PathBuf::try_from(path)
                .map_err(|error| DiscoveryError::NonUtf8Path {
                    path: error.into_path_buf(),
                })?;
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(raw_text) => cases.push(TestCase::new(path, raw_text)),
                Err(error) => {
                    warn!(
                        target: DISCOVERY_TARGET,
                        path = %path,
                        error = %error,
                        "unreadable script"
                    );
                    cases.push(TestCase::unreadable(path, error));
                }
            }
        }
        debug!(
            target: DISCOVERY_TARGET,
            pattern = %pattern,
            count = cases.len(),
            "discovered scripts"
        );
        Ok(cases)
    }
}
