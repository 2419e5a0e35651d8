//! Test fixtures for sample template trees
//!
//! Each fixture is a named JSON document that can be served from an
//! [`InMemoryTemplateSource`] or written to disk for file-based and CLI tests.

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

use crate::source::InMemoryTemplateSource;

/// A template document and the location it is served at.
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub document: Value,
}

impl TemplateFixture {
    /// Fixture with an arbitrary document.
    pub fn new(name: impl Into<String>, document: Value) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }

    /// Root template nesting [`child`](Self::child) as `Child` and consuming its `Url` output
    pub fn root() -> Self {
        Self::new(
            "root.json",
            json!({
                "Description": "Root stack",
                "Parameters": {
                    "Env": {"Type": "String", "Default": "dev"}
                },
                "Resources": {
                    "Child": {
                        "Type": "AWS::CloudFormation::Stack",
                        "Properties": {
                            "TemplateURL": "child.json",
                            "Parameters": {
                                "Name": {"Fn::Join": ["-", ["app", {"Ref": "Env"}]]}
                            }
                        }
                    },
                    "Consumer": {
                        "Type": "AWS::Lambda::Function",
                        "Properties": {
                            "Endpoint": {"Fn::GetAtt": ["Child", "Outputs.Url"]}
                        }
                    }
                },
                "Outputs": {
                    "Endpoint": {"Value": {"Fn::GetAtt": ["Consumer", "Endpoint"]}},
                    "BucketName": {"Value": {"Fn::GetAtt": ["Child", "Outputs.BucketName"]}}
                }
            }),
        )
    }

    /// Child template with a required `Name` parameter and a `Url` output of `http://x`
    pub fn child() -> Self {
        Self::new(
            "child.json",
            json!({
                "Parameters": {
                    "Name": {"Type": "String"}
                },
                "Resources": {
                    "Bucket": {
                        "Type": "AWS::S3::Bucket",
                        "Properties": {"BucketName": {"Ref": "Name"}}
                    }
                },
                "Outputs": {
                    "Url": {"Value": "http://x"},
                    "BucketName": {"Value": {"Ref": "Name"}}
                }
            }),
        )
    }

    /// Two resources referencing each other
    pub fn cycle() -> Self {
        Self::new(
            "cycle.json",
            json!({
                "Resources": {
                    "A": {"Type": "AWS::SNS::Topic", "Properties": {"Peer": {"Ref": "B"}}},
                    "B": {"Type": "AWS::SNS::Topic", "Properties": {"Peer": {"Ref": "A"}}}
                }
            }),
        )
    }

    /// Root whose nested stack points at a location nothing serves
    pub fn broken_child() -> Self {
        Self::new(
            "broken.json",
            json!({
                "Resources": {
                    "Child": {
                        "Type": "AWS::CloudFormation::Stack",
                        "Properties": {"TemplateURL": "missing.json"}
                    }
                }
            }),
        )
    }

    /// Write the document as pretty JSON into `dir`, returning its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.document)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write fixture {}", path.display()))?;
        Ok(path)
    }
}

/// In-memory source serving every fixture at its name.
pub fn source_with(fixtures: &[TemplateFixture]) -> InMemoryTemplateSource {
    fixtures.iter().fold(InMemoryTemplateSource::new(), |source, fixture| {
        source.with_template(fixture.name.clone(), fixture.document.clone())
    })
}
