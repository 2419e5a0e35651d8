//! Resolution of template trees read from disk.

use serde_json::json;
use std::sync::Arc;

use crate::common::TestProject;
use stackview_cli::config::ResolverConfig;
use stackview_cli::resolver::{ParameterSet, StackResolver};
use stackview_cli::source::FileTemplateSource;
use stackview_cli::test_utils::{TemplateFixture, init_test_logging, resolver_for};

fn file_resolver(project: &TestProject) -> StackResolver {
    init_test_logging(None);
    StackResolver::new(Arc::new(FileTemplateSource::with_base_dir(project.path())))
}

#[tokio::test]
async fn test_resolve_tree_from_files() {
    let project = TestProject::with_fixtures(&[TemplateFixture::root(), TemplateFixture::child()]).unwrap();
    let resolver = file_resolver(&project);

    let stack = resolver
        .resolve_location("root.json", &ParameterSet::new().with("Env", json!("prod")))
        .await
        .unwrap();

    assert_eq!(stack.parameter("Env"), Some(&json!("prod")));
    assert_eq!(stack.outputs["Endpoint"], json!("http://x"));
    assert_eq!(stack.outputs["BucketName"], json!("app-prod"));

    let child = stack.nested(&["Child"]).unwrap();
    assert_eq!(child.parameter("Name"), Some(&json!("app-prod")));
    assert!(child.resources.contains_key("Bucket"));
}

#[tokio::test]
async fn test_yaml_templates_and_file_urls() {
    let project = TestProject::new().unwrap();
    let child = project
        .write(
            "child.yaml",
            "Parameters:\n  Name:\n    Type: String\nOutputs:\n  Greeting:\n    Value:\n      Fn::Join: [\" \", [hello, {Ref: Name}]]\n",
        )
        .unwrap();
    project
        .write(
            "root.yaml",
            &format!(
                "Resources:\n  Child:\n    Type: AWS::CloudFormation::Stack\n    Properties:\n      TemplateURL: file://{}\n      Parameters:\n        Name: world\nOutputs:\n  Greeting:\n    Value: {{\"Fn::GetAtt\": [Child, Outputs.Greeting]}}\n",
                child.display()
            ),
        )
        .unwrap();

    let stack = file_resolver(&project).resolve_location("root.yaml", &ParameterSet::new()).await.unwrap();
    assert_eq!(stack.outputs["Greeting"], json!("hello world"));
}

#[tokio::test]
async fn test_deeply_nested_outputs_bubble_up() {
    let level = |name: &str, child: Option<&str>| {
        let mut resources = json!({});
        let value = match child {
            Some(location) => {
                resources = json!({
                    "Inner": {
                        "Type": "AWS::CloudFormation::Stack",
                        "Properties": {"TemplateURL": location}
                    }
                });
                json!({"Fn::Join": ["/", [name, {"Fn::GetAtt": ["Inner", "Outputs.Path"]}]]})
            }
            None => json!(name),
        };
        TemplateFixture::new(
            format!("{name}.json"),
            json!({"Resources": resources, "Outputs": {"Path": {"Value": value}}}),
        )
    };

    let resolver = resolver_for(&[
        level("a", Some("b.json")),
        level("b", Some("c.json")),
        level("c", None),
    ]);

    let stack = resolver.resolve_location("a.json", &ParameterSet::new()).await.unwrap();
    assert_eq!(stack.outputs["Path"], json!("a/b/c"));
    assert_eq!(stack.total_resources(), 2);
    assert!(stack.nested(&["Inner", "Inner"]).is_some());
}

#[tokio::test]
async fn test_pseudo_parameters_available_in_every_stack() {
    let resolver = StackResolver::with_config(
        Arc::new(stackview_cli::test_utils::source_with(&[
            TemplateFixture::new(
                "root.json",
                json!({
                    "Resources": {
                        "Child": {"Type": "AWS::CloudFormation::Stack", "Properties": {"TemplateURL": "child.json"}}
                    },
                    "Outputs": {"Region": {"Value": {"Fn::GetAtt": ["Child", "Outputs.Region"]}}}
                }),
            ),
            TemplateFixture::new(
                "child.json",
                json!({"Outputs": {"Region": {"Value": {"Ref": "AWS::Region"}}}}),
            ),
        ])),
        ResolverConfig::default().with_pseudo_parameter("AWS::Region", json!("eu-west-1")),
    );

    let stack = resolver.resolve_location("root.json", &ParameterSet::new()).await.unwrap();
    assert_eq!(stack.outputs["Region"], json!("eu-west-1"));
}

#[tokio::test]
async fn test_serialized_stack_shape() {
    let resolver = resolver_for(&[TemplateFixture::root(), TemplateFixture::child()]);
    let stack = resolver.resolve_location("root.json", &ParameterSet::new()).await.unwrap();

    let value = serde_json::to_value(&stack).unwrap();
    assert_eq!(value["Description"], json!("Root stack"));
    assert_eq!(value["Parameters"]["Env"], json!("dev"));
    assert_eq!(value["Resources"]["Consumer"]["Type"], json!("AWS::Lambda::Function"));
    assert_eq!(value["Resources"]["Child"]["Stack"]["Outputs"]["Url"], json!("http://x"));
    assert_eq!(value["Outputs"]["BucketName"], json!("app-dev"));
}
