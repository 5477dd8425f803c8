//! Default configuration values

/// Product name used in archive and package file names
pub const DEFAULT_PRODUCT: &str = "mufiz";

/// Default number of concurrent build workers
pub const DEFAULT_JOBS: usize = 2;

/// Default output directory, relative to the project directory
pub const DEFAULT_OUT_DIR: &str = "pkg";

/// Default target catalog file
pub const DEFAULT_TARGETS_FILE: &str = "targets.json";

/// File the product version is read from
pub const VERSION_FILE: &str = "build.zig.zon";

/// Per-target scratch directories live under this directory
pub const SCRATCH_DIR: &str = ".release-scratch";

/// Target built with the restricted-capability profile
pub const RESTRICTED_TARGET: &str = "wasm32-wasi";

/// Native package formats built when none are requested
pub const DEFAULT_FORMATS: &[&str] = &["deb", "rpm"];

/// Minimum wait after the toolchain exits (milliseconds)
pub const DEFAULT_SETTLE_MS: u64 = 2000;

/// Interval between binary stability checks (milliseconds)
pub const SETTLE_POLL_MS: u64 = 200;

/// Upper bound on waiting for the binary to appear (seconds)
pub const SETTLE_TIMEOUT_SECS: u64 = 10;

/// Checksum manifest written into the output directory
pub const CHECKSUM_FILE: &str = "SHA256SUMS";

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
