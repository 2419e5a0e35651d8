//! Filesystem template source.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{TemplateSource, fetch_failed, parse_fetched};

const FILE_SCHEME: &str = "file://";

/// Reads templates from `file://` URLs and plain paths.
///
/// Relative paths resolve against the base directory (the current directory
/// unless configured otherwise).
#[derive(Debug, Clone, Default)]
pub struct FileTemplateSource {
    base_dir: Option<PathBuf>,
}

impl FileTemplateSource {
    /// Source resolving relative paths against the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Source resolving relative paths against `base_dir`.
    #[must_use]
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Filesystem path for `location`.
    #[must_use]
    pub fn path_for(&self, location: &str) -> PathBuf {
        let path = Path::new(location.strip_prefix(FILE_SCHEME).unwrap_or(location));
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl TemplateSource for FileTemplateSource {
    async fn fetch(&self, location: &str) -> Result<Value> {
        let path = self.path_for(location);
        tracing::debug!("Reading template {}", path.display());

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| fetch_failed(location, format!("{}: {e}", path.display())))?;

        parse_fetched(location, &text)
    }
}
