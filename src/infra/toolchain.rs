//! Toolchain management
//!
//! Handles zig toolchain invocation for cross-compiling the product.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::core::compiler::{BuildRequest, Compiler};
use crate::error::BuildError;
use crate::infra::process;

/// Zig toolchain wrapper
#[derive(Debug, Clone)]
pub struct ZigToolchain {
    /// Path to zig binary
    zig_path: PathBuf,
    /// Directory containing `build.zig`
    project_dir: PathBuf,
}

impl ZigToolchain {
    /// Create a new Zig toolchain wrapper
    pub fn new(zig_path: PathBuf, project_dir: PathBuf) -> Self {
        Self {
            zig_path,
            project_dir,
        }
    }

    /// Arguments for `zig build` for one request
    pub fn build_args(request: &BuildRequest<'_>) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("build"),
            OsString::from(format!("-Dtarget={}", request.target)),
        ];
        args.extend(request.profile.zig_flags().iter().map(OsString::from));
        args.push(OsString::from("--prefix"));
        args.push(request.prefix.as_os_str().to_os_string());
        args
    }
}

impl Compiler for ZigToolchain {
    fn compile(&self, request: &BuildRequest<'_>) -> Result<(), BuildError> {
        let zig = process::resolve_program(&self.zig_path).ok_or_else(|| {
            BuildError::ToolchainNotFound {
                toolchain: self.zig_path.display().to_string(),
            }
        })?;

        let args = Self::build_args(request);
        let outcome = process::run(&zig, &args, &self.project_dir).map_err(|e| {
            BuildError::SpawnFailed {
                command: process::display_command(&zig, &args),
                error: e.to_string(),
            }
        })?;

        if outcome.success {
            Ok(())
        } else {
            Err(BuildError::CompilerFailed {
                target: request.target.to_string(),
                code: outcome.code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compiler::BuildProfile;
    use crate::core::target::Target;
    use std::path::Path;

    #[test]
    fn test_build_args_standard() {
        let target = Target::new("x86_64-linux-musl");
        let request = BuildRequest {
            target: &target,
            profile: BuildProfile::Standard,
            prefix: Path::new("/tmp/scratch/x86_64-linux-musl"),
        };
        let args: Vec<String> = ZigToolchain::build_args(&request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "build",
                "-Dtarget=x86_64-linux-musl",
                "-Doptimize=ReleaseFast",
                "--prefix",
                "/tmp/scratch/x86_64-linux-musl",
            ]
        );
    }

    #[test]
    fn test_build_args_restricted() {
        let target = Target::new("wasm32-wasi");
        let request = BuildRequest {
            target: &target,
            profile: BuildProfile::Restricted,
            prefix: Path::new("/tmp/scratch/wasm32-wasi"),
        };
        let args = ZigToolchain::build_args(&request);
        assert!(args.contains(&OsString::from("-Dsandbox=true")));
        assert!(!args.contains(&OsString::from("-Doptimize=ReleaseFast")));
    }

    #[test]
    fn test_missing_zig_is_toolchain_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let zig = ZigToolchain::new(
            PathBuf::from("zig-not-installed-7c1e"),
            dir.path().to_path_buf(),
        );
        let target = Target::new("x86_64-linux");
        let request = BuildRequest {
            target: &target,
            profile: BuildProfile::Standard,
            prefix: dir.path(),
        };
        assert!(matches!(
            zig.compile(&request),
            Err(BuildError::ToolchainNotFound { .. })
        ));
    }
}
