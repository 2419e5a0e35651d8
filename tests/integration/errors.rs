//! Failure propagation through stack trees.

use serde_json::json;
use std::sync::Arc;

use stackview_cli::core::{StackError, find_stack_error, user_friendly_error};
use stackview_cli::resolver::{ParameterSet, StackResolver};
use stackview_cli::source::FileTemplateSource;
use stackview_cli::test_utils::{TemplateFixture, resolver_for};

#[tokio::test]
async fn test_missing_child_fails_whole_tree() {
    let resolver = resolver_for(&[TemplateFixture::broken_child()]);

    let error = resolver.resolve_location("broken.json", &ParameterSet::new()).await.unwrap_err();

    assert!(matches!(
        find_stack_error(&error),
        Some(StackError::TemplateFetchFailed { location, .. }) if location == "missing.json"
    ));
}

#[tokio::test]
async fn test_failure_deep_in_tree_names_the_path() {
    let resolver = resolver_for(&[
        TemplateFixture::new(
            "top.json",
            json!({
                "Resources": {
                    "Middle": {"Type": "AWS::CloudFormation::Stack", "Properties": {"TemplateURL": "middle.json"}}
                }
            }),
        ),
        TemplateFixture::new(
            "middle.json",
            json!({
                "Resources": {
                    "Bottom": {"Type": "AWS::CloudFormation::Stack", "Properties": {"TemplateURL": "bottom.json"}}
                }
            }),
        ),
        TemplateFixture::new(
            "bottom.json",
            json!({"Outputs": {"Broken": {"Value": {"Ref": "Nowhere"}}}}),
        ),
    ]);

    let error = resolver.resolve_location("top.json", &ParameterSet::new()).await.unwrap_err();

    assert_eq!(
        find_stack_error(&error),
        Some(&StackError::UnresolvedReference {
            name: "Nowhere".to_string()
        })
    );
    let chain = format!("{error:#}");
    assert!(chain.contains("'Middle'"));
    assert!(chain.contains("'Bottom'"));
    assert!(chain.contains("'Broken'"));
}

#[tokio::test]
async fn test_cycle_reported_with_suggestion() {
    let resolver = resolver_for(&[TemplateFixture::cycle()]);

    let error = resolver.resolve_location("cycle.json", &ParameterSet::new()).await.unwrap_err();
    assert!(matches!(find_stack_error(&error), Some(StackError::DependencyCycle { .. })));

    let context = user_friendly_error(error);
    assert!(context.to_string().contains("A, B"));
    assert!(context.suggestion.is_some());
}

#[tokio::test]
async fn test_missing_document_is_fetch_failure() {
    let resolver = resolver_for(&[]);
    let error = resolver.resolve_location("nothing.json", &ParameterSet::new()).await.unwrap_err();

    assert!(matches!(
        find_stack_error(&error),
        Some(StackError::TemplateFetchFailed { location, .. }) if location == "nothing.json"
    ));
}

#[tokio::test]
async fn test_non_template_text_is_fetch_failure() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("page.json"), "<html>Not Found</html>").unwrap();
    std::fs::write(dir.path().join("empty.json"), "").unwrap();
    std::fs::write(
        dir.path().join("parent.json"),
        json!({
            "Resources": {
                "Child": {
                    "Type": "AWS::CloudFormation::Stack",
                    "Properties": {"TemplateURL": "page.json"}
                }
            }
        })
        .to_string(),
    )
    .unwrap();
    let resolver = StackResolver::new(Arc::new(FileTemplateSource::with_base_dir(dir.path())));

    for location in ["page.json", "empty.json"] {
        let error = resolver.resolve_location(location, &ParameterSet::new()).await.unwrap_err();
        assert!(
            matches!(
                find_stack_error(&error),
                Some(StackError::TemplateFetchFailed { location: failed, .. }) if failed == location
            ),
            "{location}: {error:#}"
        );
    }

    let error = resolver.resolve_location("parent.json", &ParameterSet::new()).await.unwrap_err();
    assert!(matches!(
        find_stack_error(&error),
        Some(StackError::TemplateFetchFailed { location, .. }) if location == "page.json"
    ));
    assert!(format!("{error:#}").contains("'Child'"));
}

#[tokio::test]
async fn test_malformed_join_rejected_before_resolution() {
    let resolver = resolver_for(&[TemplateFixture::new(
        "bad.json",
        json!({"Outputs": {"Bad": {"Value": {"Fn::Join": ["-"]}}}}),
    )]);

    let error = resolver.resolve_location("bad.json", &ParameterSet::new()).await.unwrap_err();
    assert!(matches!(
        find_stack_error(&error),
        Some(StackError::MalformedIntrinsic { function, .. }) if function == "Fn::Join"
    ));
}
