//! Native Linux packages
//!
//! Linux archives are converted into deb/rpm/pacman packages by an external
//! packager. The packager names its output after the mapped architecture,
//! not the target, so each invocation runs in its own temporary directory and
//! the result is renamed to the target-qualified name straight away.
//!
//! Targets missing from the architecture tables are skipped, not errors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::core::archive::Archive;
use crate::core::target::Target;
use crate::error::{ConfigError, NativePackageError};
use crate::infra::filesystem;

/// Debian architecture names, keyed by target
const DEB_ARCH: &[(&str, &str)] = &[
    ("x86_64-linux", "amd64"),
    ("x86-linux", "i386"),
    ("aarch64-linux", "arm64"),
    ("arm-linux", "arm"),
    ("mips64-linux-musl", "mips64"),
    ("mips64el-linux-musl", "mips64el"),
    ("mipsel-linux-musl", "mipsel"),
    ("mips-linux-musl", "mips"),
    ("powerpc64-linux", "powerpc64"),
    ("powerpc64le-linux", "powerpc64le"),
    ("powerpc-linux", "powerpc"),
    ("riscv64-linux", "riscv64"),
];

/// RPM architecture names, keyed by target
const RPM_ARCH: &[(&str, &str)] = &[
    ("x86_64-linux", "x86_64"),
    ("x86-linux", "i386"),
    ("aarch64-linux", "aarch64"),
    ("arm-linux", "arm"),
    ("mips64-linux-musl", "mips64"),
    ("mips64el-linux-musl", "mips64el"),
    ("mipsel-linux-musl", "mipsel"),
    ("mips-linux-musl", "mips"),
    ("powerpc64-linux", "ppc64"),
    ("powerpc64le-linux", "ppc64le"),
    ("powerpc-linux", "ppc"),
    ("riscv64-linux", "riscv64"),
];

/// Native package formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    /// Debian package
    Deb,
    /// RPM package
    Rpm,
    /// Arch Linux package
    Pacman,
}

impl PackageFormat {
    /// Every supported format
    pub const ALL: [Self; 3] = [Self::Deb, Self::Rpm, Self::Pacman];

    /// Name understood by the external packager (`-t`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Pacman => "pacman",
        }
    }

    /// File extension of packages in this format
    pub fn extension(self) -> &'static str {
        match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
            Self::Pacman => "pkg.tar.zst",
        }
    }

    /// Architecture naming convention used by this format
    fn arch_table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Deb => DEB_ARCH,
            Self::Rpm | Self::Pacman => RPM_ARCH,
        }
    }

    /// File name the external packager gives its output
    pub fn packager_output_name(self, product: &str, version: &str, arch: &str) -> String {
        match self {
            Self::Deb => format!("{product}_{version}_{arch}.deb"),
            Self::Rpm => format!("{product}-{version}-1.{arch}.rpm"),
            Self::Pacman => format!("{product}-{version}-1-{arch}.pkg.tar.zst"),
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deb" => Ok(Self::Deb),
            "rpm" => Ok(Self::Rpm),
            "pacman" => Ok(Self::Pacman),
            other => Err(ConfigError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

/// Debian architecture for a target
pub fn deb_arch(target: &Target) -> Option<&'static str> {
    arch_for(target, PackageFormat::Deb)
}

/// RPM architecture for a target
pub fn rpm_arch(target: &Target) -> Option<&'static str> {
    arch_for(target, PackageFormat::Rpm)
}

/// Packager architecture for a target in a given format
pub fn arch_for(target: &Target, format: PackageFormat) -> Option<&'static str> {
    format
        .arch_table()
        .iter()
        .find(|(key, _)| *key == target.as_str())
        .map(|(_, arch)| *arch)
}

/// Resolved packaging parameters for one `(target, format)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    /// Target being packaged
    pub target: Target,
    /// Output format
    pub format: PackageFormat,
    /// Packager architecture name
    pub arch: &'static str,
}

impl PackageSpec {
    /// Look up the spec; `None` when the target is not a packaged Linux target
    pub fn lookup(target: &Target, format: PackageFormat) -> Option<Self> {
        arch_for(target, format).map(|arch| Self {
            target: target.clone(),
            format,
            arch,
        })
    }

    /// Final, target-qualified package name
    pub fn release_name(&self, product: &str, version: &str) -> String {
        format!(
            "{product}_{version}_{}.{}",
            self.target,
            self.format.extension()
        )
    }
}

/// One external packager invocation
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    /// Product name
    pub product: &'a str,
    /// Release version
    pub version: &'a str,
    /// Target, format and architecture
    pub spec: &'a PackageSpec,
    /// Archive to convert
    pub archive: &'a Path,
    /// File name the packager should write
    pub output_name: &'a str,
}

/// An external tool that converts an archive into a native package
pub trait ExternalPackager: Send + Sync {
    /// Produce one package inside `work_dir`
    fn invoke(&self, request: &PackageRequest<'_>, work_dir: &Path)
        -> Result<(), NativePackageError>;
}

/// Result of packaging one target in one format
#[derive(Debug, Clone, PartialEq)]
pub struct PackageResult {
    /// Target packaged
    pub target: Target,
    /// Format produced
    pub format: PackageFormat,
    /// Final package path, or why there is none
    pub outcome: Result<PathBuf, NativePackageError>,
}

/// Builds native packages for Linux archives
#[derive(Debug)]
pub struct NativePackageBuilder<P> {
    packager: P,
    product: String,
    out_dir: PathBuf,
    formats: Vec<PackageFormat>,
}

impl<P: ExternalPackager> NativePackageBuilder<P> {
    /// Create a builder writing into `out_dir`
    pub fn new(
        packager: P,
        product: &str,
        out_dir: impl Into<PathBuf>,
        formats: Vec<PackageFormat>,
    ) -> Self {
        Self {
            packager,
            product: product.to_string(),
            out_dir: out_dir.into(),
            formats,
        }
    }

    /// Whether any configured format applies to `target`
    pub fn is_applicable(&self, target: &Target) -> bool {
        self.formats
            .iter()
            .any(|format| PackageSpec::lookup(target, *format).is_some())
    }

    /// Build every configured format for one archive
    ///
    /// Returns an empty list when the target has no architecture mapping.
    pub fn build_native_packages(&self, archive: &Archive) -> Vec<PackageResult> {
        if !self.is_applicable(&archive.target) {
            tracing::debug!("No native packages for {}", archive.target);
            return Vec::new();
        }

        self.formats
            .iter()
            .filter_map(|format| PackageSpec::lookup(&archive.target, *format))
            .map(|spec| {
                let outcome = self.build_one(&spec, archive);
                match &outcome {
                    Ok(path) => tracing::info!(
                        "Built {} package for {}: {}",
                        spec.format,
                        spec.target,
                        path.display()
                    ),
                    Err(e) => tracing::warn!("{e}"),
                }
                PackageResult {
                    target: spec.target.clone(),
                    format: spec.format,
                    outcome,
                }
            })
            .collect()
    }

    fn build_one(&self, spec: &PackageSpec, archive: &Archive) -> Result<PathBuf, NativePackageError> {
        if !archive.path.is_file() {
            return Err(NativePackageError::ArchiveMissing {
                path: archive.path.clone(),
            });
        }
        let archive_path = std::fs::canonicalize(&archive.path).map_err(|e| {
            NativePackageError::Io {
                path: archive.path.clone(),
                error: e.to_string(),
            }
        })?;

        let work_dir = tempfile::Builder::new()
            .prefix(".native-")
            .tempdir_in(&self.out_dir)
            .map_err(|e| NativePackageError::Io {
                path: self.out_dir.clone(),
                error: e.to_string(),
            })?;

        let output_name = spec
            .format
            .packager_output_name(&self.product, &archive.version, spec.arch);
        let request = PackageRequest {
            product: &self.product,
            version: &archive.version,
            spec,
            archive: &archive_path,
            output_name: &output_name,
        };
        self.packager.invoke(&request, work_dir.path())?;

        let produced = locate_output(work_dir.path(), &output_name, spec.format).ok_or_else(|| {
            NativePackageError::OutputMissing {
                target: spec.target.to_string(),
                format: spec.format.to_string(),
            }
        })?;

        let dest = self
            .out_dir
            .join(spec.release_name(&self.product, &archive.version));
        filesystem::move_file(&produced, &dest).map_err(|e| NativePackageError::Io {
            path: dest.clone(),
            error: e.to_string(),
        })?;
        Ok(dest)
    }
}

/// Find the packager's output in its work directory
///
/// Prefers the conventional name; otherwise accepts a single file with the
/// format's extension.
fn locate_output(work_dir: &Path, expected: &str, format: PackageFormat) -> Option<PathBuf> {
    let expected = work_dir.join(expected);
    if expected.is_file() {
        return Some(expected);
    }

    let suffix = format!(".{}", format.extension());
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(work_dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().ends_with(&suffix))
        })
        .collect();

    if candidates.len() == 1 {
        candidates.pop()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use crate::test_utils::generators::arbitrary_triple;
    use proptest::prelude::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes the conventional output file, failing for listed formats
    struct FakePackager {
        failing: Vec<PackageFormat>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakePackager {
        fn new(failing: Vec<PackageFormat>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ExternalPackager for FakePackager {
        fn invoke(
            &self,
            request: &PackageRequest<'_>,
            work_dir: &Path,
        ) -> Result<(), NativePackageError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.spec.format.to_string(), request.spec.arch.to_string()));
            if self.failing.contains(&request.spec.format) {
                return Err(NativePackageError::PackagerFailed {
                    target: request.spec.target.to_string(),
                    format: request.spec.format.to_string(),
                    code: Some(1),
                });
            }
            std::fs::write(work_dir.join(request.output_name), "pkg").unwrap();
            Ok(())
        }
    }

    fn archive(dir: &Path, target: &str) -> Archive {
        let path = dir.join(format!("mufiz_1.0.0_{target}.zip"));
        std::fs::write(&path, "zip").unwrap();
        Archive {
            target: Target::new(target),
            version: "1.0.0".to_string(),
            path,
        }
    }

    #[test]
    fn test_powerpc64le_dual_mapping() {
        let target = Target::new("powerpc64le-linux");
        assert_eq!(deb_arch(&target), Some("powerpc64le"));
        assert_eq!(rpm_arch(&target), Some("ppc64le"));
    }

    #[test]
    fn test_pacman_uses_rpm_names() {
        let target = Target::new("x86_64-linux");
        assert_eq!(arch_for(&target, PackageFormat::Pacman), Some("x86_64"));
        assert_eq!(arch_for(&target, PackageFormat::Deb), Some("amd64"));
    }

    #[test]
    fn test_tables_have_same_targets() {
        let deb: Vec<&str> = DEB_ARCH.iter().map(|(k, _)| *k).collect();
        let rpm: Vec<&str> = RPM_ARCH.iter().map(|(k, _)| *k).collect();
        assert_eq!(deb, rpm);
    }

    #[test]
    fn test_unmapped_target_is_skipped() {
        assert!(PackageSpec::lookup(&Target::new("aarch64-macos"), PackageFormat::Deb).is_none());
        assert!(PackageSpec::lookup(&Target::new("x86_64-linux-musl"), PackageFormat::Rpm).is_none());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("deb".parse::<PackageFormat>().unwrap(), PackageFormat::Deb);
        assert_eq!("RPM".parse::<PackageFormat>().unwrap(), PackageFormat::Rpm);
        assert!(matches!(
            "snap".parse::<PackageFormat>(),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_packager_output_names() {
        assert_eq!(
            PackageFormat::Deb.packager_output_name("mufiz", "0.6.0", "amd64"),
            "mufiz_0.6.0_amd64.deb"
        );
        assert_eq!(
            PackageFormat::Rpm.packager_output_name("mufiz", "0.6.0", "x86_64"),
            "mufiz-0.6.0-1.x86_64.rpm"
        );
        assert_eq!(
            PackageFormat::Pacman.packager_output_name("mufiz", "0.6.0", "x86_64"),
            "mufiz-0.6.0-1-x86_64.pkg.tar.zst"
        );
    }

    #[test]
    fn test_builds_deb_and_rpm_with_target_names() {
        let dir = TempDir::new().unwrap();
        let archive = archive(dir.path(), "x86_64-linux");
        let builder = NativePackageBuilder::new(
            FakePackager::new(vec![]),
            "mufiz",
            dir.path(),
            vec![PackageFormat::Deb, PackageFormat::Rpm],
        );

        let results = builder.build_native_packages(&archive);

        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].outcome.as_ref().unwrap(),
            &dir.path().join("mufiz_1.0.0_x86_64-linux.deb")
        );
        assert_eq!(
            results[1].outcome.as_ref().unwrap(),
            &dir.path().join("mufiz_1.0.0_x86_64-linux.rpm")
        );
        let calls = builder.packager.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                ("deb".to_string(), "amd64".to_string()),
                ("rpm".to_string(), "x86_64".to_string())
            ]
        );
    }

    #[test]
    fn test_one_format_failing_does_not_block_other() {
        let dir = TempDir::new().unwrap();
        let archive = archive(dir.path(), "aarch64-linux");
        let builder = NativePackageBuilder::new(
            FakePackager::new(vec![PackageFormat::Deb]),
            "mufiz",
            dir.path(),
            vec![PackageFormat::Deb, PackageFormat::Rpm],
        );

        let results = builder.build_native_packages(&archive);

        assert!(results[0].outcome.is_err());
        assert!(results[1].outcome.is_ok());
        assert!(dir.path().join("mufiz_1.0.0_aarch64-linux.rpm").exists());
    }

    #[test]
    fn test_non_linux_target_not_applicable() {
        let dir = TempDir::new().unwrap();
        let archive = archive(dir.path(), "aarch64-macos");
        let builder = NativePackageBuilder::new(
            FakePackager::new(vec![]),
            "mufiz",
            dir.path(),
            vec![PackageFormat::Deb, PackageFormat::Rpm],
        );

        assert!(builder.build_native_packages(&archive).is_empty());
        assert!(builder.packager.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_archive_is_recorded() {
        let dir = TempDir::new().unwrap();
        let archive = Archive {
            target: Target::new("riscv64-linux"),
            version: "1.0.0".to_string(),
            path: dir.path().join("missing.zip"),
        };
        let builder = NativePackageBuilder::new(
            FakePackager::new(vec![]),
            "mufiz",
            dir.path(),
            vec![PackageFormat::Deb],
        );

        let results = builder.build_native_packages(&archive);
        assert!(matches!(
            results[0].outcome,
            Err(NativePackageError::ArchiveMissing { .. })
        ));
    }

    #[test]
    fn test_locate_output_falls_back_to_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mufiz-1.0.0-20240101.x86_64.rpm"), "rpm").unwrap();
        let found = locate_output(dir.path(), "mufiz-1.0.0-1.x86_64.rpm", PackageFormat::Rpm);
        assert_eq!(found, Some(dir.path().join("mufiz-1.0.0-20240101.x86_64.rpm")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn prop_arch_lookup_is_pure(triple in arbitrary_triple()) {
            let target = Target::new(triple);
            for format in PackageFormat::ALL {
                prop_assert_eq!(arch_for(&target, format), arch_for(&target, format));
            }
            // deb and rpm maps cover the same targets, so formats come in sets
            prop_assert_eq!(deb_arch(&target).is_some(), rpm_arch(&target).is_some());
        }
    }
}
