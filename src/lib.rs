//! stackview - resolve CloudFormation-style template trees
//!
//! Given a root template, stackview computes the fully resolved stack tree a
//! deployment would produce: effective parameter values, resources with every
//! `Ref`, `Fn::GetAtt` and `Fn::Join` substituted, nested stacks fetched and
//! resolved recursively, and evaluated outputs at every level.
//!
//! # Architecture Overview
//!
//! - Templates are decoded once into typed expression trees ([`template`]); an
//!   unknown `Fn::*` key is rejected at that point, before any resolution starts
//! - Resources load as soon as the resources they reference are resolved, so
//!   independent nested stacks are fetched concurrently ([`resolver`])
//! - Fetching is behind the [`source::TemplateSource`] trait; files, HTTP(S) and an
//!   in-memory source are provided
//! - Every stack only sees its own parameters and resources; a parent reads a child
//!   exclusively through `Fn::GetAtt [Child, Outputs.<Name>]`
//! - Output is deterministic: all maps are ordered by name
//!
//! # Core Modules
//!
//! - [`core`] - Error types and user-facing error formatting
//! - [`template`] - Template model, expression decoding and the function registry
//! - [`resolver`] - Parameters, references, evaluation, scheduling and outputs
//! - [`source`] - Template sources (file, HTTP, routing, in-memory)
//! - [`config`] - Global (`~/.stackview/config.toml`) and resolver configuration
//! - [`cli`] - The `stackview` command-line interface
//! - [`constants`] - Markers and default limits
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use stackview_cli::resolver::{ParameterSet, StackResolver};
//! use stackview_cli::source::InMemoryTemplateSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let source = InMemoryTemplateSource::new().with_template(
//!     "root.json",
//!     json!({"Outputs": {"Name": {"Value": {"Fn::Join": ["-", ["a", "b"]]}}}}),
//! );
//! let resolver = StackResolver::new(Arc::new(source));
//! let stack = resolver.resolve_location("root.json", &ParameterSet::new()).await?;
//! assert_eq!(stack.outputs["Name"], json!("a-b"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod resolver;
pub mod source;
pub mod template;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
