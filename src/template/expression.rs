//! Tagged expression trees decoded from template property values.
//!
//! Property values are decoded once, when the template is built, into an
//! [`Expression`]. Evaluation and dependency extraction then match on the variant
//! instead of probing JSON objects for well-known keys every time.
//!
//! Recognised shapes:
//! - `{"Ref": "<name>"}` (exactly one key, string argument)
//! - `{"Fn::GetAtt": ["<name>", "<attribute>"]}` or `{"Fn::GetAtt": "<name>.<attribute>"}`
//! - `{"Fn::Join": ["<separator>", [<part>, ...]]}`
//!
//! Any other single-key object whose key starts with `Fn::` is rejected with
//! [`StackError::UnknownIntrinsicFunction`]. Every other object is a plain
//! property structure and is decoded member by member.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::registry::{FunctionRegistry, Intrinsic};
use crate::core::StackError;

/// Key of the reference form.
pub const REF_KEY: &str = "Ref";

/// Prefix shared by every intrinsic function key.
pub const FN_PREFIX: &str = "Fn::";

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `null`, boolean, number or string, returned unchanged
    Literal(Value),
    /// Array whose items are evaluated in order
    List(Vec<Expression>),
    /// Object without reference or function shape, evaluated member by member
    Object(BTreeMap<String, Expression>),
    /// `{"Ref": name}`
    Ref(String),
    /// `{"Fn::GetAtt": [resource, attribute]}`
    GetAtt {
        /// Logical ID of the resource
        resource: String,
        /// Attribute name, e.g. `Arn` or `Outputs.Url`
        attribute: String,
    },
    /// `{"Fn::Join": [separator, [parts...]]}`
    Join {
        /// Separator placed between parts
        separator: String,
        /// Parts, evaluated before joining
        parts: Vec<Expression>,
    },
}

impl Expression {
    /// Decode a JSON value into an expression tree.
    ///
    /// # Errors
    ///
    /// Returns [`StackError::UnknownIntrinsicFunction`] for unrecognised `Fn::*` keys and
    /// [`StackError::MalformedIntrinsic`] when a recognised form has the wrong arguments.
    pub fn decode(value: &Value, registry: &FunctionRegistry) -> Result<Self, StackError> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| Self::decode(item, registry))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(map) => Self::decode_object(map, registry),
            scalar => Ok(Self::Literal(scalar.clone())),
        }
    }

    fn decode_object(map: &Map<String, Value>, registry: &FunctionRegistry) -> Result<Self, StackError> {
        if map.len() == 1 {
            if let Some((key, args)) = map.iter().next() {
                if key == REF_KEY {
                    return decode_ref(args);
                }
                if key.starts_with(FN_PREFIX) {
                    return match registry.lookup(key) {
                        Some(Intrinsic::GetAtt) => decode_get_att(key, args),
                        Some(Intrinsic::Join) => decode_join(key, args, registry),
                        None => Err(StackError::UnknownIntrinsicFunction {
                            name: key.clone(),
                        }),
                    };
                }
            }
        }

        map.iter()
            .map(|(key, value)| Ok((key.clone(), Self::decode(value, registry)?)))
            .collect::<Result<BTreeMap<_, _>, StackError>>()
            .map(Self::Object)
    }
}

fn malformed(function: &str, reason: impl Into<String>) -> StackError {
    StackError::MalformedIntrinsic {
        function: function.to_string(),
        reason: reason.into(),
    }
}

fn decode_ref(args: &Value) -> Result<Expression, StackError> {
    match args {
        Value::String(name) if !name.is_empty() => Ok(Expression::Ref(name.clone())),
        _ => Err(malformed(REF_KEY, format!("expected a non-empty name, found {args}"))),
    }
}

fn decode_get_att(key: &str, args: &Value) -> Result<Expression, StackError> {
    let (resource, attribute) = match args {
        Value::Array(items) => match items.as_slice() {
            [Value::String(resource), Value::String(attribute)] => (resource.clone(), attribute.clone()),
            _ => return Err(malformed(key, "expected [resource, attribute] strings")),
        },
        Value::String(dotted) => match dotted.split_once('.') {
            Some((resource, attribute)) => (resource.to_string(), attribute.to_string()),
            None => return Err(malformed(key, format!("expected 'resource.attribute', found '{dotted}'"))),
        },
        _ => return Err(malformed(key, "expected [resource, attribute]")),
    };

    if resource.is_empty() || attribute.is_empty() {
        return Err(malformed(key, "resource and attribute must not be empty"));
    }

    Ok(Expression::GetAtt {
        resource,
        attribute,
    })
}

fn decode_join(key: &str, args: &Value, registry: &FunctionRegistry) -> Result<Expression, StackError> {
    let Value::Array(items) = args else {
        return Err(malformed(key, "expected [separator, [parts...]]"));
    };

    match items.as_slice() {
        [Value::String(separator), Value::Array(parts)] => Ok(Expression::Join {
            separator: separator.clone(),
            parts: parts
                .iter()
                .map(|part| Expression::decode(part, registry))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        [_, Value::Array(_)] => Err(malformed(key, "separator must be a string")),
        _ => Err(malformed(key, "expected [separator, [parts...]]")),
    }
}
