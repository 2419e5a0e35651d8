//! Error handling for stackview
//!
//! This module provides the error taxonomy for stack resolution and the
//! user-facing error reporting used by the CLI. The design follows two rules:
//! 1. **Strongly-typed errors** so callers can match on the failure mode
//! 2. **User-friendly messages** with details and suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StackError`] - Enumerated failure modes of template decoding, fetching and resolution
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion for display
//!
//! Resolution code returns [`anyhow::Result`] and attaches the chain of logical IDs
//! and template locations with `.with_context(...)`. The [`StackError`] always sits at
//! the root of that chain, so callers recover it with [`find_stack_error`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use stackview_cli::core::{StackError, user_friendly_error};
//!
//! let error = anyhow::Error::from(StackError::DependencyCycle {
//!     pending: vec!["A".to_string(), "B".to_string()],
//!     cycle: Some(vec!["A".to_string(), "B".to_string(), "A".to_string()]),
//! });
//!
//! let ctx = user_friendly_error(error);
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for stack resolution.
///
/// Every variant aborts the enclosing resolution; a stack is either fully
/// resolved or not returned at all.
///
/// # Error Categories
///
/// ## Expressions
/// - [`UnresolvedReference`] - `Ref`/`Fn::GetAtt` target absent from the current stack
/// - [`ParameterWithoutValue`] - referenced parameter has no effective value
/// - [`UnknownIntrinsicFunction`] - `Fn::*` key the evaluator does not implement
/// - [`MalformedIntrinsic`] - recognised function with ill-shaped arguments
/// - [`NestedOutputUnavailable`] - `Outputs.*` attribute that cannot be read
///
/// ## Scheduling
/// - [`DependencyCycle`] - no pending resource can make progress
///
/// ## Nested stacks
/// - [`MissingTemplateLocation`] - `TemplateURL` absent, null or empty
/// - [`TemplateFetchFailed`] - the template source could not produce a document
/// - [`NestingTooDeep`] - nested stacks exceed the configured depth
///
/// ## Documents
/// - [`InvalidTemplate`] - document or section has the wrong shape
///
/// [`UnresolvedReference`]: StackError::UnresolvedReference
/// [`ParameterWithoutValue`]: StackError::ParameterWithoutValue
/// [`UnknownIntrinsicFunction`]: StackError::UnknownIntrinsicFunction
/// [`MalformedIntrinsic`]: StackError::MalformedIntrinsic
/// [`NestedOutputUnavailable`]: StackError::NestedOutputUnavailable
/// [`DependencyCycle`]: StackError::DependencyCycle
/// [`MissingTemplateLocation`]: StackError::MissingTemplateLocation
/// [`TemplateFetchFailed`]: StackError::TemplateFetchFailed
/// [`NestingTooDeep`]: StackError::NestingTooDeep
/// [`InvalidTemplate`]: StackError::InvalidTemplate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// A `Ref` or `Fn::GetAtt` names something absent from both the parameters and
    /// the resources of the current stack.
    ///
    /// Lookups never climb into a parent or sibling stack, so a name declared only in
    /// another nested stack fails here too.
    #[error("Unresolved reference '{name}'")]
    UnresolvedReference {
        /// The referenced identifier, in dotted form for attribute references
        name: String,
    },

    /// A `Ref` names a declared parameter whose effective value is absent
    #[error("Parameter '{name}' is referenced but has no value")]
    ParameterWithoutValue {
        /// Name of the parameter
        name: String,
    },

    /// An `Fn::*` function that is not implemented or is disabled
    #[error("Unknown intrinsic function '{name}'")]
    UnknownIntrinsicFunction {
        /// Full key of the function, e.g. `Fn::Split`
        name: String,
    },

    /// A recognised intrinsic function with arguments of the wrong shape
    #[error("Malformed {function}: {reason}")]
    MalformedIntrinsic {
        /// Full key of the function, e.g. `Fn::Join`
        function: String,
        /// What was wrong with the arguments
        reason: String,
    },

    /// `Fn::GetAtt [name, Outputs.output]` could not be read from a nested stack
    #[error("Output '{output}' is not available on resource '{resource}'")]
    NestedOutputUnavailable {
        /// Logical ID of the resource
        resource: String,
        /// Name of the requested output
        output: String,
    },

    /// The dependency scan made no progress while resources were still pending
    #[error("Dependency cycle between resources: {}", pending.join(", "))]
    DependencyCycle {
        /// Logical IDs still pending, sorted
        pending: Vec<String>,
        /// One concrete cycle among the pending resources, closed on its first node
        cycle: Option<Vec<String>>,
    },

    /// A nested stack resource without a usable `TemplateURL`
    #[error("Template location for nested stack '{resource}' is not set")]
    MissingTemplateLocation {
        /// Logical ID of the nested stack resource
        resource: String,
    },

    /// The template source failed to produce a document
    #[error("Failed to fetch template from '{location}': {reason}")]
    TemplateFetchFailed {
        /// Location handed to the template source
        location: String,
        /// Reason reported by the source
        reason: String,
    },

    /// Nested stacks exceed the configured maximum depth
    #[error("Nested stack depth exceeds the limit of {limit} at '{location}'")]
    NestingTooDeep {
        /// Configured limit
        limit: usize,
        /// Location of the template that would exceed it
        location: String,
    },

    /// The template document or one of its sections has the wrong shape
    #[error("Invalid template: {reason}")]
    InvalidTemplate {
        /// What was wrong with the document
        reason: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

/// Find the [`StackError`] at the root of an [`anyhow::Error`] chain.
///
/// Nested stack failures wrap the original error in one context layer per level,
/// so this walks the whole chain instead of only the outermost error.
#[must_use]
pub fn find_stack_error(error: &anyhow::Error) -> Option<&StackError> {
    error.chain().find_map(|cause| cause.downcast_ref::<StackError>())
}

/// Error context wrapper that provides user-friendly error information
///
/// Combines a [`StackError`] with optional details and a suggestion. The CLI prints
/// it to stderr with colors:
/// - Error message: red and bold
/// - Details: yellow
/// - Suggestion: green
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: StackError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no details or suggestion.
    #[must_use]
    pub const fn new(error: StackError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] for display.
///
/// Domain errors anywhere in the chain get tailored suggestions. The outer context
/// layers (which nested stack, which location) are kept as details so the user can
/// see where in the stack tree the failure happened.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let trail: Vec<String> = error
        .chain()
        .take_while(|cause| cause.downcast_ref::<StackError>().is_none())
        .map(ToString::to_string)
        .collect();

    if let Some(stack_error) = find_stack_error(&error) {
        let ctx = create_error_context(stack_error.clone());
        if trail.is_empty() {
            return ctx;
        }
        let trail = trail.join("\n  ");
        let details = match ctx.details {
            Some(details) => format!("{details}\nWhile:\n  {trail}"),
            None => format!("While:\n  {trail}"),
        };
        return ErrorContext {
            details: Some(details),
            ..ctx
        };
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::NotFound
    {
        return ErrorContext::new(StackError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check that the file or directory exists and the path is correct");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(StackError::Other {
            message: format!("Invalid configuration file: {toml_error}"),
        })
        .with_suggestion("Check the TOML syntax of your stackview config file");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(StackError::Other {
        message,
    })
}

/// Attach tailored suggestions to each [`StackError`] variant.
fn create_error_context(error: StackError) -> ErrorContext {
    match &error {
        StackError::UnresolvedReference { name } => {
            let name = name.clone();
            ErrorContext::new(error)
                .with_suggestion(format!(
                    "Declare '{name}' as a parameter or resource of the same template, or pass it in from the parent stack"
                ))
                .with_details("References are resolved only against the stack that contains them, never against a parent or sibling stack")
        }

        StackError::ParameterWithoutValue { name } => {
            let name = name.clone();
            ErrorContext::new(error).with_suggestion(format!(
                "Give '{name}' a Default, pass it with '-p {name}=VALUE', or set it in the parent stack's Parameters property"
            ))
        }

        StackError::UnknownIntrinsicFunction { .. } => ErrorContext::new(error)
            .with_suggestion("Supported functions are Ref, Fn::GetAtt and Fn::Join")
            .with_details("Unrecognised functions fail the whole resolution rather than passing through unevaluated"),

        StackError::MalformedIntrinsic { function, .. } => {
            let hint = match function.as_str() {
                "Fn::GetAtt" => "Use [\"LogicalId\", \"Attribute\"] or \"LogicalId.Attribute\"",
                "Fn::Join" => "Use [\"separator\", [part, ...]] with scalar parts",
                "Ref" => "Use {\"Ref\": \"LogicalId\"}",
                _ => "Check the function arguments",
            };
            ErrorContext::new(error).with_suggestion(hint)
        }

        StackError::NestedOutputUnavailable { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the resource is a nested stack and that its template declares the output")
            .with_details("Fn::GetAtt with an 'Outputs.' attribute reads the outputs of a nested stack's child template"),

        StackError::DependencyCycle { cycle, .. } => {
            let details = match cycle {
                Some(cycle) => format!("Cycle: {}", cycle.join(" → ")),
                None => "No pending resource has all of its dependencies resolved".to_string(),
            };
            ErrorContext::new(error)
                .with_suggestion("Break the cycle so that at least one resource does not depend on the others")
                .with_details(details)
        }

        StackError::MissingTemplateLocation { .. } => ErrorContext::new(error)
            .with_suggestion("Set the TemplateURL property to a non-empty location"),

        StackError::TemplateFetchFailed { location, .. } => {
            let location = location.clone();
            ErrorContext::new(error)
                .with_suggestion(format!(
                    "Verify that '{location}' exists and is reachable, and that it contains a JSON or YAML template"
                ))
                .with_details("A nested stack that cannot be fetched fails the whole stack; no partial stack is produced")
        }

        StackError::NestingTooDeep { .. } => ErrorContext::new(error)
            .with_suggestion("Check for templates that include themselves, or raise max_nesting_depth in the config"),

        StackError::InvalidTemplate { .. } => ErrorContext::new(error).with_suggestion(
            "Parameters, Resources and Outputs must be objects, and every resource needs a string Type",
        ),

        StackError::Other { .. } => ErrorContext::new(error),
    }
}
