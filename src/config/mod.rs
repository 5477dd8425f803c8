//! Configuration and constants
//!
//! [`ReleaseConfig`] is the resolved, immutable configuration of one run.
//! It is built once by the CLI layer and shared by every pipeline stage.

pub mod defaults;

use std::path::PathBuf;
use std::time::Duration;

use crate::core::compiler::SettleBarrier;
use crate::core::native::PackageFormat;

/// Resolved configuration for one release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Product name (archive and package prefix)
    pub product: String,
    /// Release version (semver)
    pub version: String,
    /// Project directory the toolchain runs in
    pub project_dir: PathBuf,
    /// Directory receiving archives and packages
    pub out_dir: PathBuf,
    /// Root of the per-target scratch directories
    pub scratch_dir: PathBuf,
    /// Number of concurrent build workers
    pub jobs: usize,
    /// Native package formats to produce for Linux targets
    pub formats: Vec<PackageFormat>,
    /// Target built with the restricted-capability profile
    pub restricted_target: String,
    /// Post-build barrier settings
    pub settle: SettleBarrier,
    /// Skip the native package stage
    pub skip_native: bool,
}

impl ReleaseConfig {
    /// Create a configuration with defaults for everything but the version
    pub fn new(project_dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        let project_dir = project_dir.into();
        Self {
            product: defaults::DEFAULT_PRODUCT.to_string(),
            version: version.into(),
            out_dir: project_dir.join(defaults::DEFAULT_OUT_DIR),
            scratch_dir: project_dir.join(defaults::SCRATCH_DIR),
            project_dir,
            jobs: effective_jobs(defaults::DEFAULT_JOBS),
            formats: defaults::DEFAULT_FORMATS
                .iter()
                .filter_map(|f| f.parse().ok())
                .collect(),
            restricted_target: defaults::RESTRICTED_TARGET.to_string(),
            settle: SettleBarrier::default(),
            skip_native: false,
        }
    }

    /// Set the output directory
    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Set the number of workers (clamped to the available CPUs)
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = effective_jobs(jobs);
        self
    }

    /// Set the native package formats
    #[must_use]
    pub fn with_formats(mut self, formats: Vec<PackageFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Set the product name
    #[must_use]
    pub fn with_product(mut self, product: &str) -> Self {
        self.product = product.to_string();
        self
    }

    /// Set the restricted-profile target
    #[must_use]
    pub fn with_restricted_target(mut self, target: &str) -> Self {
        self.restricted_target = target.to_string();
        self
    }

    /// Set the minimum post-build delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle = self.settle.with_min_delay(delay);
        self
    }

    /// Replace the post-build barrier
    #[must_use]
    pub fn with_settle(mut self, settle: SettleBarrier) -> Self {
        self.settle = settle;
        self
    }

    /// Enable or disable the native package stage
    #[must_use]
    pub fn with_skip_native(mut self, skip: bool) -> Self {
        self.skip_native = skip;
        self
    }
}

/// Clamp a requested worker count to `1..=available CPUs`
pub fn effective_jobs(requested: usize) -> usize {
    requested.clamp(1, num_cpus::get().max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_relative_to_project() {
        let config = ReleaseConfig::new("/work/mufiz", "0.6.0");
        assert_eq!(config.out_dir, PathBuf::from("/work/mufiz/pkg"));
        assert_eq!(
            config.scratch_dir,
            PathBuf::from("/work/mufiz/.release-scratch")
        );
        assert_eq!(config.product, "mufiz");
        assert_eq!(
            config.formats,
            vec![PackageFormat::Deb, PackageFormat::Rpm]
        );
    }

    #[test]
    fn test_effective_jobs_never_zero() {
        assert_eq!(effective_jobs(0), 1);
        assert!(effective_jobs(2) >= 1);
        assert!(effective_jobs(10_000) <= num_cpus::get().max(1));
    }
}
