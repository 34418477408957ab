// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Writes pipeline definitions into temporary directories for the engine and CLI tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Serial root with a file-backed step and a parallel group; succeeds.
pub const PIPELINE_OK: &str = r#"
name: test-pipeline-001
log:
  disabled: true
steps:
  - name: greet
    path: echo
    args: ["hello"]
    stdout: devnul
  - parallel:
      - path: "true"
      - path: sh
        args: ["-c", "sleep 0.1"]
"#;

/// A propagating failure inside a parallel group aborts the serial root.
pub const PIPELINE_EXIT_67: &str = r#"
name: test-pipeline-002
log:
  disabled: true
steps:
  - path: "true"
  - parallel:
      - path: sh
        args: ["-c", "sleep 0.1 && exit 1"]
        onExit: restart
      - path: sh
        args: ["-c", "sleep 0.3 && exit 67"]
  - path: sh
    args: ["-c", "exit 99"]
"#;

/// A step outliving its own timeout.
pub const PIPELINE_TIMEOUT: &str = r#"
name: test-pipeline-004
log:
  disabled: true
steps:
  - name: exit-64
    path: sh
    args: ["-c", "sleep 3; exit 64"]
    timeout: 200ms
"#;

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Write `yaml` to `<name>.yaml` and return its path.
    pub fn write_pipeline(&self, name: &str, yaml: &str) -> PathBuf {
        let pipeline_file = self.file(&format!("{}.yaml", name));
        std::fs::write(&pipeline_file, yaml).expect("Failed to write pipeline file");
        pipeline_file
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).unwrap_or_default()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
