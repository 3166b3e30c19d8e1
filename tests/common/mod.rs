//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Create a temporary directory with a taskweave.yml file
pub fn create_test_manifest(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let manifest_path = temp_dir.path().join("taskweave.yml");
    fs::write(&manifest_path, content).unwrap();
    (temp_dir, manifest_path)
}

/// Run a rendered command with `sh -c` inside `dir`
pub fn run_shell(command: &str, dir: &Path) -> Output {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(dir)
        .output()
        .unwrap()
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
