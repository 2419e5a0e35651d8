//! Integration tests for the `stackview deps` command.

use predicates::prelude::*;
use serde_json::{Value, json};

use crate::common::TestProject;
use stackview_cli::test_utils::TemplateFixture;

#[test]
fn test_deps_tree() {
    let project = TestProject::with_fixtures(&[TemplateFixture::root()]).unwrap();

    project
        .command()
        .args(["deps", "root.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└── Consumer"))
        .stdout(predicate::str::contains("Load order: Child, Consumer"));
}

#[test]
fn test_deps_does_not_fetch_children() {
    // child.json is not written; deps only reads the given template
    let project = TestProject::with_fixtures(&[TemplateFixture::broken_child()]).unwrap();

    project.command().args(["deps", "broken.json"]).assert().success();
}

#[test]
fn test_deps_json() {
    let project = TestProject::with_fixtures(&[TemplateFixture::root()]).unwrap();

    let output = project.command().args(["deps", "root.json", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["order"], json!(["Child", "Consumer"]));
    assert_eq!(report["dependencies"]["Consumer"], json!(["Child"]));
    assert_eq!(report["dependencies"]["Child"], json!([]));
}

#[test]
fn test_deps_cycle() {
    let project = TestProject::with_fixtures(&[TemplateFixture::cycle()]).unwrap();

    project
        .command()
        .args(["deps", "cycle.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Dependency cycle"));
}
