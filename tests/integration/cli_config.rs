//! Integration tests for `stackview config` and config file handling.

use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;
use stackview_cli::test_utils::TemplateFixture;

#[test]
fn test_config_path_honours_env() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stackview-config.toml"));
}

#[test]
fn test_config_flag_overrides_env() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["--config", "other.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("other.toml"));
}

#[test]
fn test_config_init_and_show() {
    let project = TestProject::new().unwrap();

    project.command().args(["config", "init"]).assert().success();
    assert!(project.config_path().exists());

    project.command().args(["config", "init"]).assert().failure();
    project.command().args(["config", "init", "--force"]).assert().success();

    project
        .command()
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nested_stack_type"))
        .stdout(predicate::str::contains("AWS::Region"));
}

#[test]
fn test_config_pseudo_parameters_used_by_resolve() {
    let project = TestProject::with_fixtures(&[TemplateFixture::new(
        "region.json",
        json!({"Outputs": {"Region": {"Value": {"Ref": "AWS::Region"}}}}),
    )])
    .unwrap();
    std::fs::write(project.config_path(), "[pseudo_parameters]\n\"AWS::Region\" = \"ap-south-1\"\n").unwrap();

    project
        .command()
        .args(["resolve", "region.json", "--outputs-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ap-south-1"));
}

#[test]
fn test_config_disabled_function() {
    let project = TestProject::with_fixtures(&[TemplateFixture::root(), TemplateFixture::child()]).unwrap();
    std::fs::write(project.config_path(), "disabled_functions = [\"Fn::Join\"]\n").unwrap();

    project
        .command()
        .args(["resolve", "root.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown intrinsic function 'Fn::Join'"));
}

#[test]
fn test_invalid_config_reported() {
    let project = TestProject::with_fixtures(&[TemplateFixture::root()]).unwrap();
    std::fs::write(project.config_path(), "max_nesting_depth = [").unwrap();

    project
        .command()
        .args(["resolve", "root.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
