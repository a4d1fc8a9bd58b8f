//! Shared fixtures for driving the binary against a scratch workspace.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

pub const EXISTING_WORKSPACE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Workspace
   version = "1.0">
   <FileRef
      location = "group:App/App.xcodeproj">
   </FileRef>
</Workspace>
"#;

/// A temporary directory holding `App.xcworkspace` with one existing project reference.
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub workspace: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let workspace = temp_dir.path().join("App.xcworkspace");
        std::fs::create_dir(&workspace).expect("Failed to create workspace");
        std::fs::write(workspace.join("contents.xcworkspacedata"), EXISTING_WORKSPACE)
            .expect("Failed to write workspace data");

        Self {
            temp_dir,
            workspace,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn workspace_arg(&self) -> String {
        self.workspace.to_string_lossy().into_owned()
    }

    pub fn workspace_data(&self) -> String {
        self.read("App.xcworkspace/contents.xcworkspacedata")
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    /// Every path below the temp directory, sorted.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        let mut paths = vec![];
        let mut queue = vec![self.path().to_path_buf()];
        while let Some(dir) = queue.pop() {
            for entry in std::fs::read_dir(&dir).expect("Failed to read dir") {
                let path = entry.expect("Failed to read dir entry").path();
                if path.is_dir() {
                    queue.push(path.clone());
                }
                paths.push(path);
            }
        }
        paths.sort();
        paths
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("add-xcodeproj").expect("Binary not found");
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        cmd
    }

    /// A command with `--name`, `--workspace` and `--org` filled in.
    pub fn add(&self, name: &str) -> Command {
        let mut cmd = self.command();
        cmd.args(["--name", name, "--workspace", &self.workspace_arg(), "--org", "org.example"]);
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
