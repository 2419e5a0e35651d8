//! Global constants used throughout the stackview codebase.
//!
//! Template markers, default limits, and the retry parameters of the HTTP
//! template source live here so that they are discoverable in one place. None of
//! them is read implicitly by the resolver: the defaults flow into
//! [`ResolverConfig`](crate::config::ResolverConfig) and can be overridden there.

use std::time::Duration;

/// Resource type marking a nested stack.
pub const DEFAULT_NESTED_STACK_TYPE: &str = "AWS::CloudFormation::Stack";

/// Property of a nested stack resource holding the child template location.
pub const TEMPLATE_URL_PROPERTY: &str = "TemplateURL";

/// Property of a nested stack resource holding the parameters passed to the child.
pub const PARAMETERS_PROPERTY: &str = "Parameters";

/// `Fn::GetAtt` attribute that yields the resource itself.
pub const ARN_ATTRIBUTE: &str = "Arn";

/// `Fn::GetAtt` attribute prefix that reads an output of a nested stack.
pub const OUTPUTS_ATTRIBUTE_PREFIX: &str = "Outputs.";

/// Maximum depth of nested stacks below the root template.
///
/// Protects against templates that (directly or indirectly) include themselves.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Default timeout for a single HTTP template fetch (30 seconds).
pub fn default_fetch_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Default number of retries after a failed HTTP fetch.
pub const DEFAULT_FETCH_RETRIES: usize = 3;

/// Starting delay for exponential backoff between fetch retries (100ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 100;

/// Maximum backoff delay between fetch retries (2 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 2_000;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "STACKVIEW_CONFIG";
