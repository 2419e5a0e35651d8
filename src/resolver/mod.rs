//! Stack resolution for stackview.
//!
//! This module turns a parsed [`Template`] into a fully resolved [`Stack`]: effective
//! parameters, concrete resource properties, nested stacks and evaluated outputs.
//!
//! # Resolution Process
//!
//! For one template, [`StackResolver`] runs these phases:
//!
//! 1. **Parameters** ([`parameters`]): each declared parameter takes its value from
//!    the template's explicit `Value`, then the inherited value from the parent, then
//!    its `Default`.
//! 2. **Dependencies** ([`references`]): every resource's properties are scanned for
//!    `Ref` and `Fn::GetAtt`; a reference naming another declared resource is an
//!    ordering constraint.
//! 3. **Resources** (`scheduler`): resources are loaded as soon as their
//!    dependencies are resolved, concurrently where independent. A resource whose
//!    type is the configured nested stack marker fetches its child template through
//!    the [`TemplateSource`] and resolves it recursively.
//! 4. **Outputs** ([`outputs`]): evaluated once every resource is resolved.
//!
//! Evaluation ([`evaluator`]) only ever sees the current stack's parameters and
//! resources; a child stack is reachable from its parent solely through
//! `Fn::GetAtt [Child, Outputs.<Name>]`.
//!
//! # Failure Behavior
//!
//! Resolution is strict: the first failure anywhere in the tree aborts the whole
//! resolution, and the error carries the chain of resources and locations that led
//! to it. Use [`find_stack_error`](crate::core::find_stack_error) to get at the
//! underlying [`StackError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stackview_cli::resolver::{ParameterSet, StackResolver};
//! use stackview_cli::source::FileTemplateSource;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = StackResolver::new(Arc::new(FileTemplateSource::new()));
//! let stack = resolver.resolve_location("root.json", &ParameterSet::new()).await?;
//!
//! for (name, value) in &stack.outputs {
//!     println!("{name} = {value}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod dependency_graph;
pub mod evaluator;
mod loader;
pub mod outputs;
pub mod parameters;
pub mod references;
mod scheduler;
pub mod types;

pub use dependency_graph::DependencyGraph;
pub use evaluator::{ResolutionContext, ResourceMap, evaluate, evaluate_properties};
pub use parameters::{ParameterSet, ParameterValue, resolve_parameters};
pub use references::{Reference, ReferenceMap, extract_references, template_dependencies};
pub use types::{ResolvedResource, Stack};

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::core::{StackError, find_stack_error};
use crate::source::TemplateSource;
use crate::template::Template;
use outputs::resolve_outputs;

/// Resolves templates into stacks, fetching nested templates through a
/// [`TemplateSource`].
///
/// A resolver holds no per-resolution state, so one instance can serve any number
/// of resolutions, including concurrent ones.
#[derive(Clone)]
pub struct StackResolver {
    source: Arc<dyn TemplateSource>,
    config: ResolverConfig,
}

impl std::fmt::Debug for StackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackResolver").field("config", &self.config).finish_non_exhaustive()
    }
}

impl StackResolver {
    /// Create a resolver with the default configuration.
    #[must_use]
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self::with_config(source, ResolverConfig::default())
    }

    /// Create a resolver with an explicit configuration.
    #[must_use]
    pub fn with_config(source: Arc<dyn TemplateSource>, config: ResolverConfig) -> Self {
        Self {
            source,
            config,
        }
    }

    /// The configuration this resolver uses.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve an already parsed root template.
    ///
    /// `inherited` supplies the middle precedence tier for the root's parameters, the
    /// way a parent's `Parameters` property does for a nested stack.
    ///
    /// # Errors
    ///
    /// Returns the first failure anywhere in the stack tree.
    pub async fn resolve(&self, template: &Template, inherited: &ParameterSet) -> Result<Stack> {
        self.resolve_template(template, inherited, 0).await
    }

    /// Fetch the template at `location` and resolve it as a root stack.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::TemplateFetchFailed`] if the root cannot be fetched, or
    /// the first failure anywhere in the stack tree.
    pub async fn resolve_location(&self, location: &str, inherited: &ParameterSet) -> Result<Stack> {
        self.resolve_location_at_depth(location, inherited, 0).await
    }

    /// Fetch and decode the template at `location` without resolving it.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::TemplateFetchFailed`] if the document cannot be fetched,
    /// or a decode error if it is not a valid template.
    pub async fn load_template(&self, location: &str) -> Result<Template> {
        if location.trim().is_empty() {
            return Err(StackError::TemplateFetchFailed {
                location: location.to_string(),
                reason: "template location must not be empty".to_string(),
            }
            .into());
        }

        let document = self.source.fetch(location).await.map_err(|e| {
            if find_stack_error(&e).is_some() {
                e
            } else {
                StackError::TemplateFetchFailed {
                    location: location.to_string(),
                    reason: format!("{e:#}"),
                }
                .into()
            }
        })?;

        Template::from_value(&document, &self.config.functions)
            .with_context(|| format!("Invalid template at '{location}'"))
    }

    /// Compute the load order of `template`'s resources without resolving anything.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DependencyCycle`] if the resources reference each other
    /// in a cycle.
    pub fn plan(&self, template: &Template) -> Result<LoadPlan, StackError> {
        LoadPlan::for_template(template)
    }

    async fn resolve_template(
        &self,
        template: &Template,
        inherited: &ParameterSet,
        depth: usize,
    ) -> Result<Stack> {
        let parameters = resolve_parameters(template, inherited);
        let resources = scheduler::resolve_resources(self, template, &parameters, depth).await?;

        let ctx = ResolutionContext::new(&parameters, &resources, &self.config.pseudo_parameters);
        let outputs = resolve_outputs(template, &ctx)?;

        let resources = resources
            .into_iter()
            .map(|(logical_id, resource)| (logical_id, Arc::unwrap_or_clone(resource)))
            .collect();

        Ok(Stack {
            description: template.description.clone(),
            parameters: parameters.into_values(),
            resources,
            outputs,
        })
    }

    /// Fetch and resolve the template at `location` as a stack at `depth`.
    ///
    /// Boxed because nested stacks recurse back into this through the loader.
    pub(crate) fn resolve_location_at_depth<'a>(
        &'a self,
        location: &'a str,
        inherited: &'a ParameterSet,
        depth: usize,
    ) -> BoxFuture<'a, Result<Stack>> {
        Box::pin(async move {
            if depth > self.config.max_nesting_depth {
                return Err(StackError::NestingTooDeep {
                    limit: self.config.max_nesting_depth,
                    location: location.to_string(),
                }
                .into());
            }

            let template = self.load_template(location).await?;
            let stack = self.resolve_template(&template, inherited, depth).await?;

            tracing::info!(
                "Resolved stack '{location}' ({} resources, {} outputs)",
                stack.resources.len(),
                stack.outputs.len()
            );
            Ok(stack)
        })
    }
}

/// Static view of how a template's resources would be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    /// In-template resources each resource waits for
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    /// One valid load order, dependencies first
    pub order: Vec<String>,
}

impl LoadPlan {
    /// Build the plan for `template`.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::DependencyCycle`] if no load order exists.
    pub fn for_template(template: &Template) -> Result<Self, StackError> {
        let dependencies = template_dependencies(template);
        let order = DependencyGraph::from_dependencies(&dependencies).topological_order()?;
        Ok(Self {
            dependencies,
            order,
        })
    }

    /// The dependency graph behind this plan.
    #[must_use]
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_dependencies(&self.dependencies)
    }
}
