//! Scheme-based routing between template sources.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::{FileTemplateSource, HttpTemplateSource, TemplateSource, fetch_failed};

/// Sends `http://`/`https://` locations to an HTTP source and everything else
/// without a scheme, or with `file://`, to a file source.
///
/// Locations with any other scheme (e.g. `s3://`) fail without a fetch attempt.
#[derive(Debug, Clone)]
pub struct RoutingTemplateSource {
    file: FileTemplateSource,
    http: HttpTemplateSource,
}

impl RoutingTemplateSource {
    /// Combine a file source and an HTTP source.
    #[must_use]
    pub const fn new(file: FileTemplateSource, http: HttpTemplateSource) -> Self {
        Self {
            file,
            http,
        }
    }
}

#[async_trait]
impl TemplateSource for RoutingTemplateSource {
    async fn fetch(&self, location: &str) -> Result<Value> {
        match location.split_once("://").map(|(scheme, _)| scheme.to_ascii_lowercase()) {
            None => self.file.fetch(location).await,
            Some(scheme) if scheme == "file" => self.file.fetch(location).await,
            Some(scheme) if scheme == "http" || scheme == "https" => self.http.fetch(location).await,
            Some(scheme) => Err(fetch_failed(location, format!("unsupported location scheme '{scheme}'"))),
        }
    }
}
