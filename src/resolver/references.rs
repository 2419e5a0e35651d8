//! Reference extraction from expression trees.
//!
//! Walks a decoded [`Expression`] and records every `Ref` and `Fn::GetAtt` it
//! contains without evaluating anything. Each occurrence is recorded with its
//! location as a JSON pointer (RFC 6901) relative to the walked node, so
//! diagnostics can point at the exact reference site.
//!
//! For scheduling, only the resource part of a reference matters: `Fn::GetAtt
//! [Child, Outputs.Url]` depends on `Child` as a whole, because the nested stack
//! must finish resolving before any of its outputs can be read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::template::{Expression, Intrinsic, ResourceSpec, Template};

/// A symbolic reference found in an expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference {
    /// Parameter name or logical ID
    pub target: String,
    /// Attribute for `Fn::GetAtt`, `None` for `Ref`
    pub attribute: Option<String>,
}

impl Reference {
    /// Reference produced by `{"Ref": target}`.
    #[must_use]
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attribute: None,
        }
    }

    /// Reference produced by `{"Fn::GetAtt": [target, attribute]}`.
    #[must_use]
    pub fn attribute(target: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            attribute: Some(attribute.into()),
        }
    }

    /// The name this reference depends on for scheduling.
    #[must_use]
    pub fn dependency(&self) -> &str {
        &self.target
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{}.{attribute}", self.target),
            None => write!(f, "{}", self.target),
        }
    }
}

/// Every reference in an expression, with the JSON pointers of its occurrences.
pub type ReferenceMap = BTreeMap<Reference, Vec<String>>;

/// Extract all references contained in `expr`.
#[must_use]
pub fn extract_references(expr: &Expression) -> ReferenceMap {
    let mut references = ReferenceMap::new();
    collect(expr, String::new(), &mut references);
    references
}

/// Extract all references in a resource's properties.
///
/// Pointers are rooted at the resource, e.g. `/Properties/SubnetId`.
#[must_use]
pub fn extract_resource_references(resource: &ResourceSpec) -> ReferenceMap {
    let mut references = ReferenceMap::new();
    for (name, expr) in &resource.properties {
        collect(expr, format!("/Properties/{}", escape(name)), &mut references);
    }
    references
}

/// In-template resources that `logical_id` must wait for.
///
/// A reference gates loading only when it names another declared resource. `Ref`
/// to a parameter is always satisfied, and names declared nowhere in the template do
/// not gate at all (evaluation reports them later).
#[must_use]
pub fn resource_dependencies(template: &Template, resource: &ResourceSpec) -> BTreeSet<String> {
    extract_resource_references(resource)
        .into_keys()
        .filter(|reference| {
            let is_parameter_ref =
                reference.attribute.is_none() && template.has_parameter(&reference.target);
            !is_parameter_ref && template.has_resource(reference.dependency())
        })
        .map(|reference| reference.target)
        .collect()
}

/// Dependency set of every resource in `template`, keyed by logical ID.
#[must_use]
pub fn template_dependencies(template: &Template) -> BTreeMap<String, BTreeSet<String>> {
    template
        .resources
        .iter()
        .map(|(logical_id, resource)| (logical_id.clone(), resource_dependencies(template, resource)))
        .collect()
}

fn collect(expr: &Expression, pointer: String, references: &mut ReferenceMap) {
    match expr {
        Expression::Literal(_) => {}
        Expression::Ref(target) => {
            references.entry(Reference::to(target.as_str())).or_default().push(pointer);
        }
        Expression::GetAtt { resource, attribute } => {
            references
                .entry(Reference::attribute(resource.as_str(), attribute.as_str()))
                .or_default()
                .push(pointer);
        }
        Expression::List(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, format!("{pointer}/{index}"), references);
            }
        }
        Expression::Object(members) => {
            for (key, value) in members {
                collect(value, format!("{pointer}/{}", escape(key)), references);
            }
        }
        Expression::Join { parts, .. } => {
            let parts_pointer = format!("{pointer}/{}/1", escape(Intrinsic::Join.key()));
            for (index, part) in parts.iter().enumerate() {
                collect(part, format!("{parts_pointer}/{index}"), references);
            }
        }
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::FunctionRegistry;
    use serde_json::{Value, json};

    fn decode(value: Value) -> Expression {
        Expression::decode(&value, &FunctionRegistry::standard()).unwrap()
    }

    fn template(document: Value) -> Template {
        Template::from_value(&document, &FunctionRegistry::standard()).unwrap()
    }

    #[test]
    fn test_extract_nested_references() {
        let expr = decode(json!({
            "SubnetIds": [{"Ref": "SubnetA"}, {"Ref": "SubnetB"}],
            "Tags": [{"Key": "Name", "Value": {"Fn::Join": ["-", [{"Ref": "Env"}, "web"]]}}],
            "Role": {"Fn::GetAtt": ["Role", "Arn"]},
            "Again": {"Ref": "Env"}
        }));

        let references = extract_references(&expr);
        assert_eq!(references.len(), 4);
        assert_eq!(references[&Reference::to("SubnetA")], vec!["/SubnetIds/0".to_string()]);
        assert_eq!(references[&Reference::to("SubnetB")], vec!["/SubnetIds/1".to_string()]);
        assert_eq!(
            references[&Reference::to("Env")],
            vec!["/Again".to_string(), "/Tags/0/Value/Fn::Join/1/0".to_string()]
        );
        assert_eq!(references[&Reference::attribute("Role", "Arn")], vec!["/Role".to_string()]);
    }

    #[test]
    fn test_plain_objects_are_not_references() {
        let expr = decode(json!({"Key": "Ref", "Value": {"Nested": {"Ref": "X", "Extra": 1}}}));
        assert!(extract_references(&expr).is_empty());
    }

    #[test]
    fn test_identifier_forms() {
        assert_eq!(Reference::to("Vpc").to_string(), "Vpc");
        let output = Reference::attribute("Child", "Outputs.Url");
        assert_eq!(output.to_string(), "Child.Outputs.Url");
        assert_eq!(output.dependency(), "Child");
    }

    #[test]
    fn test_resource_pointers_are_escaped() {
        let template = template(json!({
            "Resources": {
                "A": {"Type": "T", "Properties": {"a/b": {"Ref": "B"}, "c~d": [{"Ref": "B"}]}},
                "B": {"Type": "T"}
            }
        }));
        let references = extract_resource_references(&template.resources["A"]);
        assert_eq!(
            references[&Reference::to("B")],
            vec!["/Properties/a~1b".to_string(), "/Properties/c~0d/0".to_string()]
        );
    }

    #[test]
    fn test_resource_dependencies() {
        let template = template(json!({
            "Parameters": {"Env": {"Default": "dev"}},
            "Resources": {
                "Vpc": {"Type": "AWS::EC2::VPC"},
                "Child": {"Type": "AWS::CloudFormation::Stack"},
                "Instance": {
                    "Type": "AWS::EC2::Instance",
                    "Properties": {
                        "Env": {"Ref": "Env"},
                        "VpcId": {"Ref": "Vpc"},
                        "Url": {"Fn::GetAtt": ["Child", "Outputs.Url"]},
                        "External": {"Ref": "NotDeclared"}
                    }
                }
            }
        }));

        let deps = resource_dependencies(&template, &template.resources["Instance"]);
        assert_eq!(deps, BTreeSet::from(["Child".to_string(), "Vpc".to_string()]));
        assert!(resource_dependencies(&template, &template.resources["Vpc"]).is_empty());

        let all = template_dependencies(&template);
        assert_eq!(all.len(), 3);
        assert!(all["Child"].is_empty());
        assert_eq!(all["Instance"].len(), 2);
    }
}
