//! Event-driven resource scheduling for one stack.
//!
//! Every resource starts out pending. A resource is dispatched the moment all of
//! its in-template dependencies are resolved, and every completion re-scans the
//! pending set, so independent resources (including nested stacks) load
//! concurrently on the current task. When nothing is in flight and resources are
//! still pending, no further progress is possible: the remaining resources are
//! reported as a dependency cycle.

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::StackResolver;
use super::dependency_graph::DependencyGraph;
use super::evaluator::{ResolutionContext, ResourceMap};
use super::loader::load_resource;
use super::parameters::ParameterSet;
use super::references::template_dependencies;
use super::types::ResolvedResource;
use crate::core::StackError;
use crate::template::{ResourceSpec, Template};

/// Resolve every resource of `template`, respecting reference order.
///
/// `depth` is the nesting depth of `template` itself; nested stacks found here are
/// resolved at `depth + 1`.
///
/// # Errors
///
/// Fails on the first resource that fails to load, or with
/// [`StackError::DependencyCycle`] when the remaining resources wait on each other.
pub(crate) async fn resolve_resources(
    resolver: &StackResolver,
    template: &Template,
    parameters: &ParameterSet,
    depth: usize,
) -> Result<ResourceMap> {
    let dependencies = template_dependencies(template);
    let mut pending: BTreeSet<&str> = template.resources.keys().map(String::as_str).collect();
    let mut resolved = ResourceMap::new();
    let mut loading = FuturesUnordered::new();

    loop {
        let ready: Vec<&str> = pending
            .iter()
            .copied()
            .filter(|logical_id| {
                dependencies[*logical_id].iter().all(|dep| resolved.contains_key(dep))
            })
            .collect();

        for logical_id in ready {
            pending.remove(logical_id);
            let siblings: ResourceMap = dependencies[logical_id]
                .iter()
                .filter_map(|dep| resolved.get(dep).map(|r| (dep.clone(), Arc::clone(r))))
                .collect();

            tracing::debug!("Loading resource '{logical_id}' at depth {depth}");
            loading.push(load_tagged(
                resolver,
                logical_id,
                &template.resources[logical_id],
                parameters,
                siblings,
                depth,
            ));
        }

        let Some((logical_id, result)) = loading.next().await else {
            if pending.is_empty() {
                break;
            }
            return Err(cycle_error(&dependencies, &pending).into());
        };

        let resource = result.with_context(|| format!("Failed to load resource '{logical_id}'"))?;
        tracing::debug!("Resolved resource '{logical_id}'");
        resolved.insert(logical_id.to_string(), Arc::new(resource));
    }

    Ok(resolved)
}

async fn load_tagged<'a>(
    resolver: &'a StackResolver,
    logical_id: &'a str,
    resource: &'a ResourceSpec,
    parameters: &'a ParameterSet,
    siblings: ResourceMap,
    depth: usize,
) -> (&'a str, Result<ResolvedResource>) {
    let ctx = ResolutionContext::new(parameters, &siblings, &resolver.config().pseudo_parameters);
    let result = load_resource(resolver, logical_id, resource, &ctx, depth).await;
    (logical_id, result)
}

fn cycle_error(
    dependencies: &BTreeMap<String, BTreeSet<String>>,
    pending: &BTreeSet<&str>,
) -> StackError {
    let stuck: BTreeMap<String, BTreeSet<String>> = pending
        .iter()
        .map(|logical_id| {
            let waiting_on = dependencies[*logical_id]
                .iter()
                .filter(|dep| pending.contains(dep.as_str()))
                .cloned()
                .collect();
            ((*logical_id).to_string(), waiting_on)
        })
        .collect();

    let cycle = DependencyGraph::from_dependencies(&stuck).find_cycle();
    let pending: Vec<String> = pending.iter().map(|id| (*id).to_string()).collect();
    tracing::warn!("No progress possible; resources still pending: {}", pending.join(", "));

    StackError::DependencyCycle {
        pending,
        cycle,
    }
}
