//! Common test utilities for stackview integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use stackview_cli::test_utils::TemplateFixture;

/// A temporary directory holding templates and an isolated global config.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Create an empty project.
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Create a project containing `fixtures`.
    pub fn with_fixtures(fixtures: &[TemplateFixture]) -> Result<Self> {
        let project = Self::new()?;
        for fixture in fixtures {
            fixture.write_to(project.path())?;
        }
        Ok(project)
    }

    /// Project root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Global config location used by [`command`](Self::command).
    pub fn config_path(&self) -> PathBuf {
        self.path().join("stackview-config.toml")
    }

    /// Write a file relative to the project root.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// `stackview` running in the project directory with an isolated config.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("stackview").unwrap();
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env("STACKVIEW_CONFIG", self.config_path())
            .env("NO_COLOR", "1");
        cmd
    }
}
