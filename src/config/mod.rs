//! Configuration management for stackview
//!
//! Two layers:
//!
//! 1. **Global Configuration** (`~/.stackview/config.toml`) - user-wide settings, see
//!    [`GlobalConfig`]
//! 2. **Resolver Configuration** - the explicit [`ResolverConfig`] value handed to a
//!    [`StackResolver`](crate::resolver::StackResolver), derived from the global config
//!    or built directly by library users
//!
//! Nothing in the resolver reads process-wide state; the nested stack marker, the
//! function registry and the pseudo parameters all arrive through [`ResolverConfig`].
//!
//! # Global Configuration
//!
//! **Location:**
//! - Unix/macOS: `~/.stackview/config.toml`
//! - Windows: `%LOCALAPPDATA%\stackview\config.toml`
//! - Override: `--config <path>` or the `STACKVIEW_CONFIG` environment variable
//!
//! ```toml
//! nested_stack_type = "AWS::CloudFormation::Stack"
//! max_nesting_depth = 16
//! fetch_timeout_secs = 30
//! fetch_retries = 3
//! disabled_functions = []
//!
//! [pseudo_parameters]
//! "AWS::Region" = "eu-west-1"
//! "AWS::AccountId" = "123456789012"
//! ```

pub mod global;

pub use global::GlobalConfig;

use serde_json::Value;
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_MAX_NESTING_DEPTH, DEFAULT_NESTED_STACK_TYPE};
use crate::template::FunctionRegistry;

/// Settings the resolver consults while resolving a stack tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Resource type that marks a nested stack
    pub nested_stack_type: String,
    /// Maximum depth of nested stacks below the root
    pub max_nesting_depth: usize,
    /// Intrinsic functions recognised when decoding fetched templates
    pub functions: FunctionRegistry,
    /// Values `Ref` falls back to after parameters and resources, in every stack
    pub pseudo_parameters: BTreeMap<String, Value>,
}

impl ResolverConfig {
    /// Use `marker` as the nested stack resource type.
    #[must_use]
    pub fn with_nested_stack_type(mut self, marker: impl Into<String>) -> Self {
        self.nested_stack_type = marker.into();
        self
    }

    /// Limit nesting to `depth` levels below the root.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Use `functions` as the intrinsic function registry.
    #[must_use]
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Add a pseudo parameter.
    #[must_use]
    pub fn with_pseudo_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.pseudo_parameters.insert(name.into(), value);
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nested_stack_type: DEFAULT_NESTED_STACK_TYPE.to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            functions: FunctionRegistry::standard(),
            pseudo_parameters: BTreeMap::new(),
        }
    }
}
