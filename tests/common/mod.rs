//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with a catalog and a `build.zig.zon`
    pub fn with_targets(targets: &[&str], version: &str) -> Self {
        let project = Self::new();
        let list: Vec<String> = targets.iter().map(|t| format!("\"{t}\"")).collect();
        project.create_file(
            "targets.json",
            &format!("{{ \"targets\": [{}] }}", list.join(", ")),
        );
        project.create_file(
            "build.zig.zon",
            &format!(".{{\n    .name = .mufiz,\n    .version = \"{version}\",\n}}\n"),
        );
        project
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create an executable script in the test project
    #[cfg(unix)]
    pub fn create_script(&self, name: &str, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.create_file(name, content);
        let path = self.dir.path().join(name);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Names of the files in a project subdirectory, sorted
    pub fn list_dir(&self, name: &str) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path().join(name))
            .expect("Failed to read directory")
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// mufiz-release command running in the project directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mufiz-release"));
        cmd.current_dir(self.path())
            .env_remove("MUFIZ_VERSION")
            .env_remove("RUST_LOG")
            .env_remove("FAIL_TARGETS");
        cmd
    }

    /// Run mufiz-release in the project directory
    pub fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute mufiz-release")
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// zig stand-in: writes a fake binary into `<prefix>/bin`
///
/// Targets listed in `FAIL_TARGETS` (space separated) exit non-zero. Every
/// invocation is appended to `zig-calls.log`.
pub const FAKE_ZIG: &str = r#"#!/bin/sh
echo "$*" >> "$(pwd)/zig-calls.log"
target=""
prefix=""
while [ $# -gt 0 ]; do
    case "$1" in
        -Dtarget=*) target="${1#-Dtarget=}" ;;
        --prefix) shift; prefix="$1" ;;
    esac
    shift
done
for failing in $FAIL_TARGETS; do
    if [ "$failing" = "$target" ]; then
        echo "error: cannot build $target" >&2
        exit 3
    fi
done
mkdir -p "$prefix/bin"
case "$target" in
    *windows*) out="$prefix/bin/mufiz.exe" ;;
    wasm32-*|wasm64-*) out="$prefix/bin/mufiz.wasm" ;;
    *) out="$prefix/bin/mufiz" ;;
esac
printf 'mufiz for %s\n' "$target" > "$out"
"#;

/// fpm stand-in: writes the `-p` output name into the working directory
pub const FAKE_FPM: &str = r#"#!/bin/sh
out=""
while [ $# -gt 0 ]; do
    case "$1" in
        -p) shift; out="$1" ;;
    esac
    shift
done
printf 'native package\n' > "$out"
"#;
