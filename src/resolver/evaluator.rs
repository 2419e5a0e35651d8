//! Intrinsic function evaluation.
//!
//! [`evaluate`] turns one [`Expression`] into a concrete JSON value against a
//! [`ResolutionContext`]: the parameters and already-resolved resources of the
//! current stack. Lookups never leave the current stack.
//!
//! Evaluation always builds a new value; the template's expression tree is never
//! modified, so resources loading concurrently cannot observe each other's
//! substitutions.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::parameters::ParameterSet;
use super::types::ResolvedResource;
use crate::constants::{ARN_ATTRIBUTE, OUTPUTS_ATTRIBUTE_PREFIX};
use crate::core::StackError;
use crate::template::{Expression, Intrinsic};

/// Resolved resources of a stack, shared read-only with the loaders that need them.
pub type ResourceMap = BTreeMap<String, Arc<ResolvedResource>>;

/// Everything an expression may reference.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Effective parameters of the current stack
    pub parameters: &'a ParameterSet,
    /// Resources of the current stack resolved so far
    pub resources: &'a ResourceMap,
    /// Values `Ref` falls back to when a name is neither a parameter nor a resource
    pub pseudo_parameters: &'a BTreeMap<String, Value>,
}

impl<'a> ResolutionContext<'a> {
    /// Create a context over the given parameters and resources.
    #[must_use]
    pub const fn new(
        parameters: &'a ParameterSet,
        resources: &'a ResourceMap,
        pseudo_parameters: &'a BTreeMap<String, Value>,
    ) -> Self {
        Self {
            parameters,
            resources,
            pseudo_parameters,
        }
    }

    fn resource(&self, logical_id: &str, attribute: &str) -> Result<&'a ResolvedResource, StackError> {
        self.resources.get(logical_id).map(Arc::as_ref).ok_or_else(|| {
            StackError::UnresolvedReference {
                name: format!("{logical_id}.{attribute}"),
            }
        })
    }

    fn lookup_ref(&self, name: &str) -> Result<Value, StackError> {
        if let Some(parameter) = self.parameters.get(name) {
            return parameter.value.clone().ok_or_else(|| StackError::ParameterWithoutValue {
                name: name.to_string(),
            });
        }

        if let Some(resource) = self.resources.get(name) {
            return resource_value(resource);
        }

        self.pseudo_parameters.get(name).cloned().ok_or_else(|| StackError::UnresolvedReference {
            name: name.to_string(),
        })
    }
}

/// Evaluate `expr` against `ctx`.
///
/// # Errors
///
/// - [`StackError::UnresolvedReference`] when a `Ref`/`Fn::GetAtt` target is not in scope
/// - [`StackError::ParameterWithoutValue`] when a referenced parameter is unset
/// - [`StackError::NestedOutputUnavailable`] for unreadable `Outputs.*` attributes
/// - [`StackError::MalformedIntrinsic`] when a `Fn::Join` part is not a scalar
pub fn evaluate(expr: &Expression, ctx: &ResolutionContext<'_>) -> Result<Value, StackError> {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::List(items) => {
            items.iter().map(|item| evaluate(item, ctx)).collect::<Result<Vec<_>, _>>().map(Value::Array)
        }
        Expression::Object(members) => members
            .iter()
            .map(|(key, value)| Ok((key.clone(), evaluate(value, ctx)?)))
            .collect::<Result<serde_json::Map<_, _>, StackError>>()
            .map(Value::Object),
        Expression::Ref(name) => ctx.lookup_ref(name),
        Expression::GetAtt { resource, attribute } => evaluate_get_att(resource, attribute, ctx),
        Expression::Join { separator, parts } => {
            let parts = parts
                .iter()
                .map(|part| evaluate(part, ctx).and_then(|value| join_part(&value)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::String(parts.join(separator)))
        }
    }
}

/// Evaluate every property of a resource into a JSON object.
///
/// # Errors
///
/// Returns the first error of [`evaluate`].
pub fn evaluate_properties(
    properties: &BTreeMap<String, Expression>,
    ctx: &ResolutionContext<'_>,
) -> Result<serde_json::Map<String, Value>, StackError> {
    properties.iter().map(|(name, expr)| Ok((name.clone(), evaluate(expr, ctx)?))).collect()
}

fn evaluate_get_att(
    logical_id: &str,
    attribute: &str,
    ctx: &ResolutionContext<'_>,
) -> Result<Value, StackError> {
    let resource = ctx.resource(logical_id, attribute)?;

    if attribute == ARN_ATTRIBUTE {
        return resource_value(resource);
    }

    if let Some(output) = attribute.strip_prefix(OUTPUTS_ATTRIBUTE_PREFIX) {
        return resource
            .stack
            .as_ref()
            .and_then(|stack| stack.outputs.get(output))
            .cloned()
            .ok_or_else(|| StackError::NestedOutputUnavailable {
                resource: logical_id.to_string(),
                output: output.to_string(),
            });
    }

    tracing::warn!(
        "Attribute '{attribute}' of '{logical_id}' cannot be resolved to a concrete value; using a placeholder"
    );
    Ok(Value::String(attribute_placeholder(logical_id, attribute)))
}

/// Placeholder produced for attributes that only exist once a resource is deployed.
#[must_use]
pub fn attribute_placeholder(logical_id: &str, attribute: &str) -> String {
    format!("Attr::{logical_id}::{attribute}")
}

/// JSON form of a resolved resource, as returned by `Ref` and `Fn::GetAtt [.., Arn]`.
fn resource_value(resource: &ResolvedResource) -> Result<Value, StackError> {
    serde_json::to_value(resource).map_err(|e| StackError::Other {
        message: format!("Failed to serialize resource: {e}"),
    })
}

fn join_part(value: &Value) -> Result<String, StackError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Null => Ok(String::new()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => Err(StackError::MalformedIntrinsic {
            function: Intrinsic::Join.key().to_string(),
            reason: format!("cannot join non-scalar value {value}"),
        }),
    }
}
