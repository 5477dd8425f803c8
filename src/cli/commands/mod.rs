//! CLI command implementations
//!
//! Each command is implemented in its own submodule. Flags shared between
//! commands live in the argument groups below.

pub mod checksums;
pub mod collect;
pub mod native;
pub mod release;
pub mod targets;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::config::defaults::{
    DEFAULT_JOBS, DEFAULT_OUT_DIR, DEFAULT_SETTLE_MS, DEFAULT_TARGETS_FILE,
};
use crate::config::ReleaseConfig;
use crate::core::native::PackageFormat;
use crate::core::target::TargetCatalog;
use crate::core::version::resolve_version;
use crate::infra::fpm::FpmPackager;
use crate::infra::toolchain::ZigToolchain;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build, archive and package every catalog target
    Release {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        build: BuildArgs,

        #[command(flatten)]
        package: PackageArgs,
    },

    /// Show the target catalog
    Targets {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// Build native packages from existing release archives
    Native {
        #[command(flatten)]
        project: ProjectArgs,

        #[command(flatten)]
        package: PackageArgs,
    },

    /// Move loose native packages into the output directory
    Collect {
        /// Directory to sweep (defaults to the project directory)
        #[arg(long, value_name = "DIR")]
        from: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Regenerate the checksum manifest
    Checksums {
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Where the project and its target catalog live
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Project directory (contains build.zig)
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Target catalog file (defaults to <project-dir>/targets.json)
    #[arg(long, value_name = "FILE")]
    pub targets: Option<PathBuf>,
}

impl CatalogArgs {
    /// Path of the catalog file
    pub fn catalog_path(&self) -> PathBuf {
        self.targets
            .clone()
            .unwrap_or_else(|| self.project_dir.join(DEFAULT_TARGETS_FILE))
    }

    /// Load the catalog
    pub fn load_catalog(&self) -> Result<TargetCatalog> {
        let path = self.catalog_path();
        TargetCatalog::load(&path)
            .with_context(|| format!("Failed to load target catalog {}", path.display()))
    }
}

/// Output directory selection
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Project directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Output directory (defaults to <project-dir>/pkg)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

impl OutputArgs {
    /// Resolved output directory
    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join(DEFAULT_OUT_DIR))
    }
}

/// Release identity and output location
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Output directory (defaults to <project-dir>/pkg)
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Release version (defaults to the version in build.zig.zon)
    #[arg(long, value_name = "VERSION", env = "MUFIZ_VERSION")]
    pub release_version: Option<String>,

    /// Product name used in artifact names
    #[arg(long)]
    pub product: Option<String>,
}

/// Compilation knobs
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Number of targets built concurrently
    #[arg(short, long, env = "MUFIZ_RELEASE_JOBS", default_value_t = DEFAULT_JOBS)]
    pub jobs: usize,

    /// zig executable
    #[arg(long, value_name = "PATH", env = "ZIG", default_value = "zig")]
    pub zig: PathBuf,

    /// Minimum wait after each build before the binary is picked up
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SETTLE_MS)]
    pub settle_ms: u64,

    /// Only build and archive; skip native packages
    #[arg(long)]
    pub skip_native: bool,
}

/// Native packaging knobs
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Native package format (repeatable; defaults to deb and rpm)
    #[arg(long = "format", value_name = "FORMAT")]
    pub formats: Vec<PackageFormat>,

    /// fpm executable
    #[arg(long, value_name = "PATH", env = "FPM", default_value = "fpm")]
    pub fpm: PathBuf,
}

impl PackageArgs {
    /// The external packager
    pub fn packager(&self) -> FpmPackager {
        FpmPackager::new(self.fpm.clone())
    }
}

impl BuildArgs {
    /// The toolchain, running in `project_dir`
    pub fn toolchain(&self, project_dir: &Path) -> ZigToolchain {
        ZigToolchain::new(self.zig.clone(), project_dir.to_path_buf())
    }
}

/// Resolve the configuration shared by `release` and `native`
///
/// The project directory is made absolute so per-target prefixes stay valid
/// when the toolchain runs inside it.
pub fn resolve_config(
    project: &ProjectArgs,
    package: &PackageArgs,
    catalog: &TargetCatalog,
) -> Result<ReleaseConfig> {
    let project_dir = std::fs::canonicalize(&project.catalog.project_dir).with_context(|| {
        format!(
            "Project directory {} does not exist",
            project.catalog.project_dir.display()
        )
    })?;
    let version = resolve_version(project.release_version.as_deref(), &project_dir)
        .context("Failed to determine the release version")?;

    let mut config = ReleaseConfig::new(&project_dir, version);
    if let Some(out_dir) = &project.out_dir {
        config = config.with_out_dir(out_dir);
    }
    if let Some(product) = &project.product {
        config = config.with_product(product);
    }
    if !package.formats.is_empty() {
        let mut formats = Vec::new();
        for format in &package.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        config = config.with_formats(formats);
    }
    if let Some(restricted) = catalog.restricted_target() {
        config = config.with_restricted_target(restricted);
    }
    Ok(config)
}

/// Apply compilation knobs to a resolved configuration
pub fn apply_build_args(config: ReleaseConfig, build: &BuildArgs) -> ReleaseConfig {
    config
        .with_jobs(build.jobs)
        .with_settle_delay(Duration::from_millis(build.settle_ms))
        .with_skip_native(build.skip_native)
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Release {
                project,
                build,
                package,
            } => release::execute(&project, &build, &package).await,
            Self::Targets { catalog } => targets::execute(&catalog),
            Self::Native { project, package } => native::execute(&project, &package).await,
            Self::Collect { from, output } => collect::execute(from.as_deref(), &output),
            Self::Checksums { output } => checksums::execute(&output),
        }
    }
}
