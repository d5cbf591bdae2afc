//! Script execution and response classification.
//!
//! [`TestExecutor`] substitutes the principal id into a script, submits it
//! through a [`ScriptTransport`], and compares the response with the script's
//! [`Expectation`]. Every case yields exactly one [`TestResult`]; transport
//! failures and bad directives become failing results instead of errors.

mod transport;

use std::fmt;

use serde_json::Value;
use tracing::debug;

pub use transport::{HttpTransport, RawResponse, ScriptTransport, TransportError};

use crate::credentials::Credential;
use crate::discovery::{CaseError, TestCase};
use crate::expectation::Expectation;

pub(crate) const EXECUTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::executor");

const STATUS_OK: u16 = 200;
const STATUS_INTERNAL_ERROR: u16 = 500;
const RUNTIME_FAILURE_MARKER: &str = "Script failed: Runtime";

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// The body parsed as JSON.
    Json(Value),
    /// The body was not valid JSON.
    Unparseable,
}

impl ResponseBody {
    /// Decodes `raw`, falling back to [`ResponseBody::Unparseable`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).map_or(Self::Unparseable, Self::Json)
    }

    fn error_message(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.get("error").and_then(Value::as_str),
            Self::Unparseable => None,
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Unparseable => f.write_str("<unable to parse body>"),
        }
    }
}

/// Decides whether a response satisfies `expectation`.
#[must_use]
pub fn classify(expectation: &Expectation, status: u16, body: &ResponseBody) -> bool {
    match expectation {
        Expectation::PanicError => {
            status == STATUS_INTERNAL_ERROR && *body == ResponseBody::Unparseable
        }
        Expectation::RuntimeError => {
            status == STATUS_INTERNAL_ERROR
                && body
                    .error_message()
                    .is_some_and(|message| message.contains(RUNTIME_FAILURE_MARKER))
        }
        Expectation::Success(Some(expected)) => {
            status == STATUS_OK && matches!(body, ResponseBody::Json(actual) if actual == expected)
        }
        Expectation::Success(None) => status == STATUS_OK,
    }
}

/// What was observed for a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service answered.
    Response {
        /// HTTP status code.
        status: u16,
        /// Decoded body.
        body: ResponseBody,
    },
    /// No response could be obtained.
    TransportFailure(String),
    /// The script's directive could not be read, so it was not submitted.
    InvalidDirective(String),
    /// The script file could not be read, so it was not submitted.
    UnreadableScript(String),
}

/// Verdict for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// Display name of the case.
    pub name: String,
    /// Whether the case met its expectation.
    pub passed: bool,
    /// Observation backing the verdict.
    pub outcome: Outcome,
}

impl TestResult {
    fn failed(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_owned(),
            passed: false,
            outcome,
        }
    }
}

/// Runs test cases against the service.
#[derive(Debug)]
pub struct TestExecutor<T> {
    transport: T,
    placeholder_token: String,
}

impl<T: ScriptTransport> TestExecutor<T> {
    /// Creates an executor replacing `placeholder_token` with the principal id.
    pub fn new(transport: T, placeholder_token: impl Into<String>) -> Self {
        Self {
            transport,
            placeholder_token: placeholder_token.into(),
        }
    }

    /// Executes `case` under `credential` and classifies the response.
    pub fn execute(&self, case: &TestCase, credential: &Credential) -> TestResult {
        let expectation = match case.expectation() {
            Ok(expectation) => expectation,
            Err(error) => {
                let outcome = match error {
                    CaseError::Directive(_) => Outcome::InvalidDirective(error.to_string()),
                    CaseError::Unreadable(_) => Outcome::UnreadableScript(error.to_string()),
                };
                return TestResult::failed(case.name(), outcome);
            }
        };
        let script = self.substitute(case.raw_text(), credential.principal_id());
        let response = match self.transport.submit(&script, credential) {
            Ok(response) => response,
            Err(error) => {
                debug!(target: EXECUTOR_TARGET, case = case.name(), error = %error, "transport failure");
                return TestResult::failed(case.name(), Outcome::TransportFailure(error.to_string()));
            }
        };
        let body = ResponseBody::parse(&response.body);
        let passed = classify(expectation, response.status, &body);
        debug!(
            target: EXECUTOR_TARGET,
            case = case.name(),
            status = response.status,
            passed,
            "classified response"
        );
        TestResult {
            name: case.name().to_owned(),
            passed,
            outcome: Outcome::Response {
                status: response.status,
                body,
            },
        }
    }

    fn substitute(&self, raw_text: &str, principal_id: &str) -> String {
        if self.placeholder_token.is_empty() {
            return raw_text.to_owned();
        }
        raw_text.replace(&self.placeholder_token, principal_id)
    }
}
