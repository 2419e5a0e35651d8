//! Global configuration management for stackview.
//!
//! This module handles the user-wide configuration file (`~/.stackview/config.toml`),
//! which tunes how stack trees are resolved and fetched: the nested stack marker, the
//! nesting limit, HTTP timeouts and retries, pseudo parameters available to every
//! stack, and intrinsic functions to switch off.
//!
//! # Configuration File Location
//!
//! - **Unix/macOS**: `~/.stackview/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\stackview\config.toml`
//!
//! The location can be overridden with `--config <path>` or the `STACKVIEW_CONFIG`
//! environment variable; the flag wins over the variable.
//!
//! # File Format
//!
//! ```toml
//! # Resource type that marks a nested stack
//! nested_stack_type = "AWS::CloudFormation::Stack"
//!
//! # Nested stacks deeper than this below the root are rejected
//! max_nesting_depth = 16
//!
//! # HTTP fetch settings
//! fetch_timeout_secs = 30
//! fetch_retries = 3
//!
//! # Intrinsic functions to reject while decoding templates
//! disabled_functions = []
//!
//! # Values `Ref` falls back to in every stack
//! [pseudo_parameters]
//! "AWS::Region" = "eu-west-1"
//! ```
//!
//! Every key is optional; a missing file is the same as an empty one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use super::ResolverConfig;
use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_FETCH_RETRIES, DEFAULT_MAX_NESTING_DEPTH,
    DEFAULT_NESTED_STACK_TYPE, default_fetch_timeout,
};
use crate::template::FunctionRegistry;

/// User-wide stackview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Resource type that marks a nested stack
    pub nested_stack_type: String,

    /// Maximum depth of nested stacks below the root
    pub max_nesting_depth: usize,

    /// Request timeout for HTTP fetches, in seconds
    pub fetch_timeout_secs: u64,

    /// Retries for transient HTTP failures
    pub fetch_retries: usize,

    /// Intrinsic function keys (e.g. `Fn::Join`) rejected while decoding templates
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled_functions: Vec<String>,

    /// Values `Ref` falls back to after parameters and resources
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub pseudo_parameters: BTreeMap<String, Value>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            nested_stack_type: DEFAULT_NESTED_STACK_TYPE.to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            fetch_timeout_secs: default_fetch_timeout().as_secs(),
            fetch_retries: DEFAULT_FETCH_RETRIES,
            disabled_functions: Vec::new(),
            pseudo_parameters: BTreeMap::new(),
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from the default location.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default path cannot be determined, or the file exists
    /// but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load global configuration from `path`, or from [`resolve_path`](Self::resolve_path)
    /// when no path is given.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, contains invalid TOML,
    /// or fails [`validate`](Self::validate).
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No global config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load global configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (permissions, not found, etc.)
    /// - The file contains invalid TOML syntax
    /// - The values fail [`validate`](Self::validate)
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))?;

        config.validate().with_context(|| format!("Invalid global config in {}", path.display()))?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories or the file cannot be written, or the
    /// configuration cannot be serialized.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize global config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write global config to {}", path.display()))
    }

    /// Platform default path of the global configuration file.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\stackview\config.toml`
    /// - **Unix/macOS**: `~/.stackview/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("stackview")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".stackview")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// The config file to use: `explicit`, else `STACKVIEW_CONFIG`, else the default.
    ///
    /// # Errors
    ///
    /// Returns an error only when the default path is needed and cannot be determined.
    pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path);
        }
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            _ => Self::default_path(),
        }
    }

    /// Check values that would make resolution impossible.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty nested stack type or a zero fetch timeout.
    pub fn validate(&self) -> Result<()> {
        if self.nested_stack_type.trim().is_empty() {
            anyhow::bail!("nested_stack_type must not be empty");
        }
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// HTTP request timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Resolver settings derived from this configuration.
    ///
    /// Disabled function keys that are not registered are ignored with a warning.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut functions = FunctionRegistry::standard();
        for key in &self.disabled_functions {
            if !functions.disable(key) {
                tracing::warn!("Cannot disable unknown intrinsic function '{key}'");
            }
        }

        ResolverConfig {
            nested_stack_type: self.nested_stack_type.clone(),
            max_nesting_depth: self.max_nesting_depth,
            functions,
            pseudo_parameters: self.pseudo_parameters.clone(),
        }
    }

    /// Example configuration written by `stackview config init`.
    #[must_use]
    pub fn init_example() -> Self {
        let mut config = Self::default();
        config.pseudo_parameters.insert("AWS::Region".to_string(), Value::from("us-east-1"));
        config.pseudo_parameters.insert("AWS::AccountId".to_string(), Value::from("123456789012"));
        config
    }
}
