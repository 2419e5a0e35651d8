//! Integration tests for the `stackview resolve` command.

use predicates::prelude::*;
use serde_json::{Value, json};

use crate::common::TestProject;
use stackview_cli::test_utils::TemplateFixture;

fn project() -> TestProject {
    TestProject::with_fixtures(&[TemplateFixture::root(), TemplateFixture::child()]).unwrap()
}

#[test]
fn test_resolve_prints_stack_json() {
    let project = project();

    let output = project.command().args(["resolve", "root.json"]).output().unwrap();
    assert!(output.status.success());

    let stack: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stack["Outputs"]["Endpoint"], json!("http://x"));
    assert_eq!(stack["Resources"]["Child"]["Stack"]["Parameters"]["Name"], json!("app-dev"));
}

#[test]
fn test_resolve_with_parameters() {
    let project = project();

    project
        .command()
        .args(["resolve", "root.json", "-p", "Env=prod", "--outputs-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""BucketName": "app-prod""#))
        .stdout(predicate::str::contains("Resources").not());
}

#[test]
fn test_resolve_yaml_output() {
    let project = project();

    project
        .command()
        .args(["resolve", "root.json", "--format", "yaml", "--outputs-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Endpoint: http://x"));
}

#[test]
fn test_resolve_with_base_dir() {
    let project = TestProject::new().unwrap();
    let templates = project.path().join("templates");
    std::fs::create_dir(&templates).unwrap();
    TemplateFixture::root().write_to(&templates).unwrap();
    TemplateFixture::child().write_to(&templates).unwrap();

    project
        .command()
        .args(["resolve", "root.json", "--base-dir", "templates"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://x"));
}

#[test]
fn test_resolve_missing_child_fails() {
    let project = TestProject::with_fixtures(&[TemplateFixture::broken_child()]).unwrap();

    project
        .command()
        .args(["resolve", "broken.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"))
        .stderr(predicate::str::contains("Child"));
}

#[test]
fn test_resolve_cycle_fails() {
    let project = TestProject::with_fixtures(&[TemplateFixture::cycle()]).unwrap();

    project
        .command()
        .args(["resolve", "cycle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle"));
}

#[test]
fn test_resolve_rejects_bad_arguments() {
    let project = project();

    project.command().args(["resolve", "root.json", "-p", "NoValue"]).assert().failure();
    project
        .command()
        .args(["resolve", "root.json", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let project = project();

    let output = project.command().args(["--verbose", "resolve", "root.json"]).output().unwrap();
    assert!(output.status.success());
    assert!(serde_json::from_slice::<Value>(&output.stdout).is_ok());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Resolved stack"));
}
