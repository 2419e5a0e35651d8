//! Common utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::GlobalConfig;
use crate::resolver::StackResolver;
use crate::source::{FileTemplateSource, HttpTemplateSource, RoutingTemplateSource};

/// Shared state of commands that resolve templates.
#[derive(Debug)]
pub struct CommandContext {
    /// Loaded global configuration
    pub config: GlobalConfig,
}

impl CommandContext {
    /// Load the global configuration from `config_path` or its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration exists but is invalid.
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = GlobalConfig::load_with_optional(config_path).await?;
        Ok(Self {
            config,
        })
    }

    /// Build a resolver reading local paths relative to `base_dir` and fetching
    /// `http(s)://` locations with the configured timeout and retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn resolver(&self, base_dir: Option<PathBuf>) -> Result<StackResolver> {
        let file = base_dir.map_or_else(FileTemplateSource::new, FileTemplateSource::with_base_dir);
        let http = HttpTemplateSource::new(self.config.fetch_timeout(), self.config.fetch_retries)?;
        let source = RoutingTemplateSource::new(file, http);

        Ok(StackResolver::with_config(Arc::new(source), self.config.resolver_config()))
    }
}

/// Output formats for machine-readable command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Parse a `--format` value.
    ///
    /// # Errors
    ///
    /// Returns an error naming the valid formats.
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => Err(anyhow::anyhow!("Invalid format '{other}'. Valid formats are: json, yaml")),
        }
    }

    /// Render `value` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String> {
        match self {
            Self::Json => serde_json::to_string_pretty(value).context("Failed to serialize to JSON"),
            Self::Yaml => serde_yaml::to_string(value).context("Failed to serialize to YAML"),
        }
    }
}

/// Parse a `NAME=VALUE` parameter argument.
///
/// The value is read as JSON when it parses as JSON (`8080`, `true`, `["a","b"]`)
/// and taken as a plain string otherwise.
///
/// # Errors
///
/// Returns an error when there is no `=` or the name is empty.
pub fn parse_parameter(arg: &str) -> std::result::Result<(String, Value), String> {
    let (name, raw) =
        arg.split_once('=').ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("parameter name is empty in '{arg}'"));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
