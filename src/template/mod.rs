//! Template documents: parameters, resources and outputs.
//!
//! A [`Template`] is the immutable input to stack resolution. It is decoded from a
//! JSON (or YAML) document once; every property and output value becomes an
//! [`Expression`] at that point.
//!
//! # Document shape
//!
//! ```json
//! {
//!   "Parameters": { "Env": { "Default": "dev" } },
//!   "Resources": {
//!     "Bucket": {
//!       "Type": "AWS::S3::Bucket",
//!       "Properties": { "BucketName": { "Fn::Join": ["-", ["logs", { "Ref": "Env" }]] } }
//!     }
//!   },
//!   "Outputs": { "BucketArn": { "Value": { "Fn::GetAtt": ["Bucket", "Arn"] } } }
//! }
//! ```
//!
//! Sections are optional. Keys other than the ones modelled here are ignored.

pub mod expression;
pub mod registry;

pub use expression::Expression;
pub use registry::{FunctionRegistry, Intrinsic};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::core::StackError;

/// Declared parameter of a template.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterSpec {
    /// Declared parameter type, kept for display only
    #[serde(default, rename = "Type")]
    pub parameter_type: Option<String>,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Value used when neither an explicit nor an inherited value exists
    #[serde(default)]
    pub default: Option<Value>,
    /// Explicit value, takes precedence over everything else
    #[serde(default)]
    pub value: Option<Value>,
}

/// Declared resource of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSpec {
    /// Resource type, e.g. `AWS::EC2::VPC`
    pub resource_type: String,
    /// Property expressions keyed by property name
    pub properties: BTreeMap<String, Expression>,
}

/// Declared output of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    /// Free-form description
    pub description: Option<String>,
    /// Expression evaluated once every resource is resolved
    pub value: Expression,
}

/// A decoded template document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    /// Free-form description
    pub description: Option<String>,
    /// Declared parameters keyed by name
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// Declared resources keyed by logical ID
    pub resources: BTreeMap<String, ResourceSpec>,
    /// Declared outputs keyed by name
    pub outputs: BTreeMap<String, OutputSpec>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawTemplate {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    resources: BTreeMap<String, RawResource>,
    #[serde(default)]
    outputs: BTreeMap<String, RawOutput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawResource {
    #[serde(rename = "Type")]
    resource_type: String,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawOutput {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    value: Value,
}

impl Template {
    /// Decode a template from a parsed document.
    ///
    /// # Errors
    ///
    /// Fails with [`StackError::InvalidTemplate`] when the document is not an object or a
    /// section has the wrong shape, and with the expression errors of
    /// [`Expression::decode`] (wrapped in the name of the offending resource or output).
    pub fn from_value(document: &Value, registry: &FunctionRegistry) -> Result<Self> {
        if !document.is_object() {
            return Err(StackError::InvalidTemplate {
                reason: "document must be an object".to_string(),
            }
            .into());
        }

        let raw: RawTemplate =
            serde_json::from_value(document.clone()).map_err(|e| StackError::InvalidTemplate {
                reason: e.to_string(),
            })?;

        let mut resources = BTreeMap::new();
        for (logical_id, resource) in raw.resources {
            let properties = resource
                .properties
                .unwrap_or_default()
                .iter()
                .map(|(name, value)| Ok((name.clone(), Expression::decode(value, registry)?)))
                .collect::<Result<BTreeMap<_, _>, StackError>>()
                .with_context(|| format!("Invalid properties on resource '{logical_id}'"))?;

            resources.insert(
                logical_id,
                ResourceSpec {
                    resource_type: resource.resource_type,
                    properties,
                },
            );
        }

        let mut outputs = BTreeMap::new();
        for (name, output) in raw.outputs {
            let value = Expression::decode(&output.value, registry)
                .with_context(|| format!("Invalid value for output '{name}'"))?;
            outputs.insert(
                name,
                OutputSpec {
                    description: output.description,
                    value,
                },
            );
        }

        Ok(Self {
            description: raw.description,
            parameters: raw.parameters,
            resources,
            outputs,
        })
    }

    /// Whether `name` is a declared parameter.
    #[must_use]
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Whether `logical_id` is a declared resource.
    #[must_use]
    pub fn has_resource(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }
}

/// Parse document text as JSON, falling back to YAML.
///
/// YAML documents must use the long form of intrinsic functions (`Ref:` and
/// `Fn::GetAtt:` keys); tag shorthands such as `!Ref` are not understood.
///
/// A YAML document is only accepted when it is a mapping, so plain text such as an
/// HTML error page or an empty file is not mistaken for a YAML scalar.
///
/// # Errors
///
/// Returns the JSON parse error when the text is neither JSON nor a YAML mapping.
pub fn parse_document(text: &str) -> std::result::Result<Value, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(document) => Ok(document),
        Err(json_error) => match serde_yaml::from_str::<Value>(text) {
            Ok(document) if document.is_object() => {
                tracing::debug!("Template is not JSON ({json_error}); parsed as YAML");
                Ok(document)
            }
            _ => Err(format!("not a JSON or YAML document: {json_error}")),
        },
    }
}
