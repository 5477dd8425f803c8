//! Compiler invocation
//!
//! Runs the external toolchain once per target, each into its own scratch
//! prefix, and waits on an explicit post-build barrier before handing the
//! binary to the archive step. A failing build is returned as a value so the
//! rest of the matrix keeps going.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::defaults::{DEFAULT_SETTLE_MS, SETTLE_POLL_MS, SETTLE_TIMEOUT_SECS};
use crate::core::target::Target;
use crate::error::BuildError;

/// Optimization/feature profile passed to the toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProfile {
    /// Optimized for speed, full capabilities
    Standard,
    /// Size-optimized, sandboxed, no network or filesystem access
    Restricted,
}

impl BuildProfile {
    /// Pick the profile for a target
    pub fn for_target(target: &Target, restricted_target: &str) -> Self {
        if target.as_str() == restricted_target {
            Self::Restricted
        } else {
            Self::Standard
        }
    }

    /// Build options understood by the project's `build.zig`
    pub fn zig_flags(self) -> &'static [&'static str] {
        match self {
            Self::Standard => &["-Doptimize=ReleaseFast"],
            Self::Restricted => &[
                "-Doptimize=ReleaseSmall",
                "-Dsandbox=true",
                "-Dnet=false",
                "-Dfs=false",
            ],
        }
    }
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Restricted => write!(f, "restricted"),
        }
    }
}

/// One toolchain invocation
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Target to compile for
    pub target: &'a Target,
    /// Profile to compile with
    pub profile: BuildProfile,
    /// Install prefix; the binary lands in `<prefix>/bin`
    pub prefix: &'a Path,
}

/// A toolchain that can cross-compile the product
///
/// Implementations only report whether the invocation succeeded; locating
/// the binary is the invoker's job.
pub trait Compiler: Send + Sync {
    /// Compile for one target
    fn compile(&self, request: &BuildRequest<'_>) -> Result<(), BuildError>;
}

/// Post-build barrier
///
/// Waits a minimum delay after the toolchain exits, then until the binary
/// exists and its size is unchanged between two polls, or the timeout passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleBarrier {
    min_delay: Duration,
    poll_interval: Duration,
    timeout: Duration,
}

impl Default for SettleBarrier {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(DEFAULT_SETTLE_MS),
            poll_interval: Duration::from_millis(SETTLE_POLL_MS),
            timeout: Duration::from_secs(SETTLE_TIMEOUT_SECS),
        }
    }
}

impl SettleBarrier {
    /// Barrier that only checks for existence, without waiting
    pub fn immediate() -> Self {
        Self {
            min_delay: Duration::ZERO,
            poll_interval: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    /// Set the minimum delay
    #[must_use]
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Block until `path` is settled; returns whether it exists
    pub fn wait(&self, path: &Path) -> bool {
        std::thread::sleep(self.min_delay);

        let deadline = Instant::now() + self.timeout;
        let mut last_size = None;
        loop {
            let size = std::fs::metadata(path).ok().map(|m| m.len());
            if size.is_some() && size == last_size {
                return true;
            }
            if Instant::now() >= deadline {
                return path.is_file();
            }
            last_size = size;
            std::thread::sleep(self.poll_interval);
        }
    }
}

/// Outcome of compiling one target
#[derive(Debug, Clone, PartialEq)]
pub struct BuildResult {
    /// Target that was built
    pub target: Target,
    /// Profile the target was built with
    pub profile: BuildProfile,
    /// Path to the binary, or why there is none
    pub outcome: Result<PathBuf, BuildError>,
}

impl BuildResult {
    /// Whether the build produced a binary
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The produced binary
    pub fn binary(&self) -> Option<&Path> {
        self.outcome.as_deref().ok()
    }
}

/// Where the toolchain is expected to put the binary for `target`
///
/// Windows builds carry `.exe` and wasm builds `.wasm`; a bare name is
/// accepted and gets the suffix when archived.
pub fn binary_path(prefix: &Path, product: &str, target: &Target) -> PathBuf {
    let bin_dir = prefix.join("bin");
    let suffix = target.exe_suffix();
    let suffixed = bin_dir.join(format!("{product}{suffix}"));
    if !suffix.is_empty() && !suffixed.exists() {
        let bare = bin_dir.join(product);
        if bare.exists() {
            return bare;
        }
    }
    suffixed
}

/// Invokes a [`Compiler`] per target and applies the post-build barrier
#[derive(Debug)]
pub struct CompilerInvoker<C> {
    compiler: C,
    product: String,
    restricted_target: String,
    barrier: SettleBarrier,
}

impl<C: Compiler> CompilerInvoker<C> {
    /// Create an invoker
    pub fn new(compiler: C, product: &str, restricted_target: &str, barrier: SettleBarrier) -> Self {
        Self {
            compiler,
            product: product.to_string(),
            restricted_target: restricted_target.to_string(),
            barrier,
        }
    }

    /// Profile used for `target`
    pub fn profile_for(&self, target: &Target) -> BuildProfile {
        BuildProfile::for_target(target, &self.restricted_target)
    }

    /// Build `target` under `scratch_root` with its designated profile
    pub fn build(&self, target: &Target, scratch_root: &Path) -> BuildResult {
        self.build_with_profile(target, self.profile_for(target), scratch_root)
    }

    /// Build `target` under `scratch_root` with an explicit profile
    pub fn build_with_profile(
        &self,
        target: &Target,
        profile: BuildProfile,
        scratch_root: &Path,
    ) -> BuildResult {
        let result = |outcome: Result<PathBuf, BuildError>| BuildResult {
            target: target.clone(),
            profile,
            outcome,
        };

        let scratch = match scratch_prefix(scratch_root, target) {
            Ok(scratch) => scratch,
            Err(e) => return result(Err(e)),
        };
        if let Err(e) = reset_scratch(&scratch) {
            return result(Err(e));
        }

        tracing::info!("Building {target} ({profile} profile)");
        let request = BuildRequest {
            target,
            profile,
            prefix: &scratch,
        };
        if let Err(e) = self.compiler.compile(&request) {
            tracing::warn!("Build failed for {target}: {e}");
            return result(Err(e));
        }

        let binary = binary_path(&scratch, &self.product, target);
        if !self.barrier.wait(&binary) {
            let e = BuildError::MissingArtifact {
                target: target.to_string(),
                path: binary,
            };
            tracing::warn!("{e}");
            return result(Err(e));
        }

        tracing::info!("Built {target}: {}", binary.display());
        result(Ok(binary))
    }
}

/// Scratch prefix of `target`, which must be a direct child of `root`
pub fn scratch_prefix(root: &Path, target: &Target) -> Result<PathBuf, BuildError> {
    let prefix = root.join(target.as_str());
    let direct_child = prefix.parent() == Some(root)
        && prefix.file_name().is_some_and(|name| name == target.as_str());
    if direct_child {
        Ok(prefix)
    } else {
        Err(BuildError::Scratch {
            path: prefix,
            error: format!("'{target}' does not name a directory inside {}", root.display()),
        })
    }
}

/// Empty the scratch prefix so no earlier binary can be picked up
fn reset_scratch(scratch: &Path) -> Result<(), BuildError> {
    let err = |e: std::io::Error| BuildError::Scratch {
        path: scratch.to_path_buf(),
        error: e.to_string(),
    };
    if scratch.exists() {
        std::fs::remove_dir_all(scratch).map_err(err)?;
    }
    std::fs::create_dir_all(scratch).map_err(err)
}
