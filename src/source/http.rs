//! HTTP template source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;

use super::{TemplateSource, fetch_failed, parse_fetched};
use crate::constants::{
    DEFAULT_FETCH_RETRIES, MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS, default_fetch_timeout,
};

/// Outcome of a single failed request.
#[derive(Debug)]
enum AttemptError {
    /// Connection problems, timeouts and 5xx responses; worth retrying
    Transient(String),
    /// Any other non-success response
    Permanent(String),
}

impl AttemptError {
    fn into_reason(self) -> String {
        match self {
            Self::Transient(reason) | Self::Permanent(reason) => reason,
        }
    }
}

/// Fetches templates over HTTP(S) with a request timeout and retries.
///
/// Transport errors and server errors are retried with exponential backoff;
/// client errors such as 404 fail immediately.
#[derive(Debug, Clone)]
pub struct HttpTemplateSource {
    client: reqwest::Client,
    retries: usize,
}

impl HttpTemplateSource {
    /// Create a source with the given request timeout and retry count.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be initialised (e.g. no TLS backend).
    pub fn new(timeout: Duration, retries: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stackview/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            retries,
        })
    }

    /// Create a source with the default timeout and retry count.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be initialised.
    pub fn with_defaults() -> Result<Self> {
        Self::new(default_fetch_timeout(), DEFAULT_FETCH_RETRIES)
    }

    async fn get_text(&self, location: &str) -> std::result::Result<String, AttemptError> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AttemptError::Transient(format!("server responded with {status}")));
        }
        if !status.is_success() {
            return Err(AttemptError::Permanent(format!("server responded with {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| AttemptError::Transient(format!("failed to read response body: {e}")))
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch(&self, location: &str) -> Result<Value> {
        tracing::debug!("Fetching template {location}");

        let strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(self.retries);

        let text = RetryIf::spawn(
            strategy,
            || self.get_text(location),
            |error: &AttemptError| {
                let retry = matches!(error, AttemptError::Transient(_));
                if retry {
                    tracing::warn!("Retrying fetch of {location}: {error:?}");
                }
                retry
            },
        )
        .await
        .map_err(|e| fetch_failed(location, e.into_reason()))?;

        parse_fetched(location, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StackError, find_stack_error};

    #[tokio::test]
    async fn test_unreachable_host_is_fetch_failure() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let source = HttpTemplateSource::new(Duration::from_secs(2), 0).unwrap();
        let error = source.fetch("http://127.0.0.1:9/template.json").await.unwrap_err();

        assert!(matches!(
            find_stack_error(&error),
            Some(StackError::TemplateFetchFailed { location, .. })
                if location == "http://127.0.0.1:9/template.json"
        ));
    }

    #[test]
    fn test_attempt_error_reason() {
        assert_eq!(AttemptError::Permanent("404".to_string()).into_reason(), "404");
        assert_eq!(AttemptError::Transient("503".to_string()).into_reason(), "503");
    }
}
