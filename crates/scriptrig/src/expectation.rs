//! Expectations embedded in script comments.
//!
//! A script declares its expected outcome with one directive comment:
//!
//! - `-- error: panic` for an interpreter panic,
//! - `-- error: runtime` for a script runtime error,
//! - `-- ok: <json>` for a successful run with an exact result.
//!
//! A script without a directive is expected to succeed with any body. When
//! several directives are present, panic wins over runtime, which wins over
//! ok.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static PANIC_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--[ \t]?error:[ \t]?panic\b").expect("valid regex"));
static RUNTIME_DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--[ \t]?error:[ \t]?runtime\b").expect("valid regex"));
static OK_DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)--[ \t]?ok:[ \t]*([^ \t\r\n].*?)[ \t\r]*$").expect("valid regex")
});

/// Outcome a script expects from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Status 200. When a value is present the body must equal it exactly.
    Success(Option<Value>),
    /// Status 500 with a JSON error naming a runtime failure.
    RuntimeError,
    /// Status 500 with a body that is not JSON.
    PanicError,
}

/// Errors raised while reading a directive.
#[derive(Debug, Error)]
pub enum DirectiveError {
    /// The `-- ok:` literal is not valid JSON.
    #[error("'-- ok:' literal {literal:?} is not valid JSON: {source}")]
    InvalidLiteral {
        /// Text following the directive.
        literal: String,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}

impl Expectation {
    /// Derives the expectation from a script's text.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::InvalidLiteral`] when the highest-priority
    /// directive is `-- ok:` and its literal does not parse.
    pub fn parse(raw_text: &str) -> Result<Self, DirectiveError> {
        if PANIC_DIRECTIVE.is_match(raw_text) {
            return Ok(Self::PanicError);
        }
        if RUNTIME_DIRECTIVE.is_match(raw_text) {
            return Ok(Self::RuntimeError);
        }
        let Some(literal) = OK_DIRECTIVE
            .captures(raw_text)
            .and_then(|captures| captures.get(1))
        else {
            return Ok(Self::Success(None));
        };
        serde_json::from_str(literal.as_str())
            .map(|value| Self::Success(Some(value)))
            .map_err(|source| DirectiveError::InvalidLiteral {
                literal: literal.as_str().to_owned(),
                source,
            })
    }
}
