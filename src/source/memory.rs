//! In-memory template source.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{TemplateSource, fetch_failed};

/// Template source backed by a fixed map of documents.
///
/// Unknown locations fail like a missing file would. Locations registered with
/// [`with_failure`](Self::with_failure) fail with the given reason. Every fetch is
/// recorded, so tests can assert which templates were requested.
#[derive(Debug, Default)]
pub struct InMemoryTemplateSource {
    documents: HashMap<String, Value>,
    failures: HashMap<String, String>,
    fetched: Mutex<Vec<String>>,
}

impl InMemoryTemplateSource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `location`.
    #[must_use]
    pub fn with_template(mut self, location: impl Into<String>, document: Value) -> Self {
        self.documents.insert(location.into(), document);
        self
    }

    /// Fail every fetch of `location` with `reason`.
    #[must_use]
    pub fn with_failure(mut self, location: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failures.insert(location.into(), reason.into());
        self
    }

    /// Locations fetched so far, in request order.
    #[must_use]
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl TemplateSource for InMemoryTemplateSource {
    async fn fetch(&self, location: &str) -> Result<Value> {
        self.fetched.lock().unwrap_or_else(PoisonError::into_inner).push(location.to_string());

        if let Some(reason) = self.failures.get(location) {
            return Err(fetch_failed(location, reason.clone()));
        }

        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| fetch_failed(location, "no template registered at this location"))
    }
}
