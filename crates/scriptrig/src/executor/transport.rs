//! HTTP submission of scripts.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

use super::EXECUTOR_TARGET;
use crate::credentials::Credential;

/// Status and raw body returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Undecoded response body.
    pub body: String,
}

/// Errors raised while submitting a script.
///
/// These never abort a run; the executor records them as a failing result.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

/// Submits a script under a credential.
pub trait ScriptTransport {
    /// Sends `script` authenticated as `credential`.
    ///
    /// # Errors
    ///
    /// Returns an error when no response could be obtained.
    fn submit(&self, script: &str, credential: &Credential)
        -> Result<RawResponse, TransportError>;
}

/// Posts scripts to the service with HTTP Basic authentication.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Builds a transport posting to `url`.
    ///
    /// `timeout` bounds each request; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Client { source })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ScriptTransport for HttpTransport {
    fn submit(
        &self,
        script: &str,
        credential: &Credential,
    ) -> Result<RawResponse, TransportError> {
        debug!(
            target: EXECUTOR_TARGET,
            url = %self.url,
            bytes = script.len(),
            "submitting script"
        );
        let response = self
            .client
            .post(&self.url)
            .basic_auth(credential.principal_id(), Some(credential.secret()))
            .body(script.to_owned())
            .send()
            .map_err(|source| TransportError::Request {
                url: self.url.clone(),
                source,
            })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|source| TransportError::Body {
            url: self.url.clone(),
            source,
        })?;
        Ok(RawResponse { status, body })
    }
}
