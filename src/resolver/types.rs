//! Resolved stack types handed to consumers.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The fully resolved instantiation of one template.
///
/// A stack exclusively owns its resources, and a nested stack resource exclusively
/// owns its child stack. Maps are ordered by name so the serialized form is stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stack {
    /// Description copied from the template
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Effective parameter values; `None` for parameters no tier supplied
    pub parameters: BTreeMap<String, Option<Value>>,
    /// Resolved resources keyed by logical ID
    pub resources: BTreeMap<String, ResolvedResource>,
    /// Evaluated outputs keyed by name
    pub outputs: BTreeMap<String, Value>,
}

impl Stack {
    /// Resolved resource by logical ID.
    #[must_use]
    pub fn resource(&self, logical_id: &str) -> Option<&ResolvedResource> {
        self.resources.get(logical_id)
    }

    /// Evaluated output by name.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&Value> {
        self.outputs.get(name)
    }

    /// Effective value of a parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name).and_then(Option::as_ref)
    }

    /// Descend through nested stack resources by logical ID.
    ///
    /// An empty path returns `self`.
    #[must_use]
    pub fn nested(&self, path: &[&str]) -> Option<&Stack> {
        path.iter().try_fold(self, |stack, logical_id| {
            stack.resource(logical_id).and_then(|resource| resource.stack.as_deref())
        })
    }

    /// Number of resources in this stack and every nested stack below it.
    #[must_use]
    pub fn total_resources(&self) -> usize {
        self.resources
            .values()
            .map(|resource| 1 + resource.stack.as_ref().map_or(0, |stack| stack.total_resources()))
            .sum()
    }
}

/// A resource with every property reference substituted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResolvedResource {
    /// Resource type from the template
    #[serde(rename = "Type")]
    pub resource_type: String,
    /// Fully evaluated properties
    pub properties: Map<String, Value>,
    /// Child stack, only for nested stack resources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Box<Stack>>,
}

impl ResolvedResource {
    /// Whether this resource carries a child stack.
    #[must_use]
    pub const fn is_nested_stack(&self) -> bool {
        self.stack.is_some()
    }
}
