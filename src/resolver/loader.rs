//! Loading a single resource.
//!
//! Leaf resources are just their evaluated properties. Nested stack resources
//! additionally fetch the template named by their `TemplateURL` property and
//! resolve it recursively, with the evaluated `Parameters` property as the child's
//! inherited values.

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use super::StackResolver;
use super::evaluator::{ResolutionContext, evaluate_properties};
use super::parameters::ParameterSet;
use super::types::ResolvedResource;
use crate::constants::{PARAMETERS_PROPERTY, TEMPLATE_URL_PROPERTY};
use crate::core::StackError;
use crate::template::ResourceSpec;

/// Evaluate `resource` and, for nested stacks, resolve its child stack.
///
/// # Errors
///
/// - Any evaluation error of the resource's properties
/// - [`StackError::MissingTemplateLocation`] for a nested stack without a usable
///   `TemplateURL`
/// - Any error resolving the child stack, wrapped with the resource and location
pub(crate) async fn load_resource(
    resolver: &StackResolver,
    logical_id: &str,
    resource: &ResourceSpec,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<ResolvedResource> {
    let properties = evaluate_properties(&resource.properties, ctx)?;

    if resource.resource_type != resolver.config().nested_stack_type {
        return Ok(ResolvedResource {
            resource_type: resource.resource_type.clone(),
            properties,
            stack: None,
        });
    }

    let location = template_location(logical_id, &properties)?;
    let inherited = ParameterSet::from_properties(properties.get(PARAMETERS_PROPERTY));
    tracing::debug!("Resource '{logical_id}' is a nested stack at '{location}'");

    let stack = resolver
        .resolve_location_at_depth(&location, &inherited, depth + 1)
        .await
        .with_context(|| format!("Failed to resolve nested stack '{logical_id}' from '{location}'"))?;

    Ok(ResolvedResource {
        resource_type: resource.resource_type.clone(),
        properties,
        stack: Some(Box::new(stack)),
    })
}

/// The child template location of a nested stack: a non-empty `TemplateURL` string.
fn template_location(logical_id: &str, properties: &Map<String, Value>) -> Result<String, StackError> {
    match properties.get(TEMPLATE_URL_PROPERTY) {
        Some(Value::String(location)) if !location.trim().is_empty() => Ok(location.clone()),
        _ => Err(StackError::MissingTemplateLocation {
            resource: logical_id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn properties(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_template_location() {
        let props = properties(json!({"TemplateURL": "child.json"}));
        assert_eq!(template_location("Child", &props).unwrap(), "child.json");

        for invalid in [json!({}), json!({"TemplateURL": ""}), json!({"TemplateURL": null}), json!({"TemplateURL": 42})] {
            assert_eq!(
                template_location("Child", &properties(invalid)).unwrap_err(),
                StackError::MissingTemplateLocation {
                    resource: "Child".to_string()
                }
            );
        }
    }
}
