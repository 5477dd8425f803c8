//! External process execution
//!
//! External tools are judged by exit status only. Stdout is discarded and
//! stderr is captured so failures can be logged.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Exit information of a finished external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command exited with status 0
    pub success: bool,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

/// Locate an executable by name or path
pub fn resolve_program(program: &Path) -> Option<PathBuf> {
    which::which(program).ok()
}

/// Render a command line for logging
pub fn display_command(program: &Path, args: &[OsString]) -> String {
    std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion in `cwd`
pub fn run(program: &Path, args: &[OsString], cwd: &Path) -> std::io::Result<CommandOutcome> {
    tracing::debug!("Running in {}: {}", cwd.display(), display_command(program, args));

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()?;

    let outcome = CommandOutcome {
        success: output.status.success(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !outcome.success {
        tracing::debug!(
            "{} exited with {:?}: {}",
            program.display(),
            outcome.code,
            outcome.stderr.trim()
        );
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_command() {
        let args = vec![OsString::from("build"), OsString::from("-Dtarget=x86_64-linux")];
        assert_eq!(
            display_command(Path::new("zig"), &args),
            "zig build -Dtarget=x86_64-linux"
        );
    }

    #[test]
    fn test_resolve_missing_program() {
        assert!(resolve_program(Path::new("definitely-not-a-real-tool-3f9a")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = vec![OsString::from("-c"), OsString::from("echo oops >&2; exit 3")];
        let outcome = run(Path::new("sh"), &args, dir.path()).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.code, Some(3));
        assert_eq!(outcome.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_success() {
        let dir = tempfile::TempDir::new().unwrap();
        let outcome = run(Path::new("true"), &[], dir.path()).unwrap();
        assert!(outcome.success);
    }
}
