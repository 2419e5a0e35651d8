//! Template sources: fetching template documents by location.
//!
//! The resolver only knows the [`TemplateSource`] seam, a single operation that
//! turns an opaque location string into a parsed document. Implementations:
//!
//! - [`FileTemplateSource`] - `file://` URLs and filesystem paths
//! - [`HttpTemplateSource`] - `http://` and `https://` URLs, with timeout and retries
//! - [`RoutingTemplateSource`] - dispatches on the URL scheme; the CLI default
//! - [`InMemoryTemplateSource`] - fixed documents, for tests and embedding
//!
//! Every failure a source reports is a [`StackError::TemplateFetchFailed`] naming the
//! location, including documents that are neither JSON nor YAML.

mod file;
mod http;
mod memory;
mod routing;

pub use file::FileTemplateSource;
pub use http::HttpTemplateSource;
pub use memory::InMemoryTemplateSource;
pub use routing::RoutingTemplateSource;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::core::StackError;
use crate::template::parse_document;

/// Fetches template documents by location.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Fetch and parse the document at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::TemplateFetchFailed`] when the document cannot be read or
    /// parsed.
    async fn fetch(&self, location: &str) -> Result<Value>;
}

/// Build the fetch error for `location`.
pub(crate) fn fetch_failed(location: &str, reason: impl Into<String>) -> anyhow::Error {
    StackError::TemplateFetchFailed {
        location: location.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// Parse fetched text, reporting failures as fetch failures of `location`.
pub(crate) fn parse_fetched(location: &str, text: &str) -> Result<Value> {
    parse_document(text).map_err(|reason| fetch_failed(location, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::find_stack_error;
    use serde_json::json;

    #[test]
    fn test_parse_fetched() {
        assert_eq!(parse_fetched("a.json", r#"{"Resources": {}}"#).unwrap(), json!({"Resources": {}}));

        let error = parse_fetched("b.json", "{ broken").unwrap_err();
        assert!(matches!(
            find_stack_error(&error),
            Some(StackError::TemplateFetchFailed { location, .. }) if location == "b.json"
        ));
    }
}
