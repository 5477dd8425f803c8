//! fpm packager wrapper
//!
//! Converts a release zip into a native package with
//! `fpm -s zip -t <format> -n <product> -v <version> -a <arch> -p <name> <archive>`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::native::{ExternalPackager, PackageRequest};
use crate::error::NativePackageError;
use crate::infra::process;

/// fpm wrapper
#[derive(Debug, Clone)]
pub struct FpmPackager {
    fpm_path: PathBuf,
}

impl FpmPackager {
    /// Create a wrapper around the given fpm executable
    pub fn new(fpm_path: PathBuf) -> Self {
        Self { fpm_path }
    }

    /// Arguments for one invocation
    pub fn args(request: &PackageRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--force",
            "-s",
            "zip",
            "-t",
            request.spec.format.as_str(),
            "-n",
            request.product,
            "-v",
            request.version,
            "-a",
            request.spec.arch,
            "-p",
            request.output_name,
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(request.archive.as_os_str().to_os_string());
        args
    }
}

impl Default for FpmPackager {
    fn default() -> Self {
        Self::new(PathBuf::from("fpm"))
    }
}

impl ExternalPackager for FpmPackager {
    fn invoke(
        &self,
        request: &PackageRequest<'_>,
        work_dir: &Path,
    ) -> Result<(), NativePackageError> {
        let fpm = process::resolve_program(&self.fpm_path).ok_or_else(|| {
            NativePackageError::PackagerNotFound {
                packager: self.fpm_path.display().to_string(),
            }
        })?;

        let args = Self::args(request);
        let outcome = process::run(&fpm, &args, work_dir).map_err(|e| {
            NativePackageError::SpawnFailed {
                command: process::display_command(&fpm, &args),
                error: e.to_string(),
            }
        })?;

        if outcome.success {
            Ok(())
        } else {
            Err(NativePackageError::PackagerFailed {
                target: request.spec.target.to_string(),
                format: request.spec.format.to_string(),
                code: outcome.code,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::native::{PackageFormat, PackageSpec};
    use crate::core::target::Target;

    #[test]
    fn test_args_use_mapped_arch() {
        let spec = PackageSpec::lookup(&Target::new("powerpc64le-linux"), PackageFormat::Rpm)
            .expect("mapped target");
        let request = PackageRequest {
            product: "mufiz",
            version: "0.6.0",
            spec: &spec,
            archive: Path::new("/out/mufiz_0.6.0_powerpc64le-linux.zip"),
            output_name: "mufiz-0.6.0-1.ppc64le.rpm",
        };

        let args: Vec<String> = FpmPackager::args(&request)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "--force",
                "-s",
                "zip",
                "-t",
                "rpm",
                "-n",
                "mufiz",
                "-v",
                "0.6.0",
                "-a",
                "ppc64le",
                "-p",
                "mufiz-0.6.0-1.ppc64le.rpm",
                "/out/mufiz_0.6.0_powerpc64le-linux.zip",
            ]
        );
    }

    #[test]
    fn test_missing_fpm_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let spec = PackageSpec::lookup(&Target::new("x86_64-linux"), PackageFormat::Deb)
            .expect("mapped target");
        let request = PackageRequest {
            product: "mufiz",
            version: "1.0.0",
            spec: &spec,
            archive: Path::new("mufiz_1.0.0_x86_64-linux.zip"),
            output_name: "mufiz_1.0.0_amd64.deb",
        };
        let fpm = FpmPackager::new(PathBuf::from("fpm-not-installed-91b2"));
        assert!(matches!(
            fpm.invoke(&request, dir.path()),
            Err(NativePackageError::PackagerNotFound { .. })
        ));
    }
}
