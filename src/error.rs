//! Error types for mufiz-release
//!
//! Domain-specific error types using thiserror. Only [`ConfigError`] aborts a
//! run; the per-target errors are recorded in outcomes and surface in the
//! final report.

use std::path::PathBuf;
use thiserror::Error;

/// Target catalog and release configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("Target catalog not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Configuration file is not valid JSON/TOML
    #[error("Failed to parse '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Required field missing
    #[error("'{path}' is missing required field '{field}'")]
    MissingField { path: PathBuf, field: String },

    /// Same target listed twice
    #[error("Target '{target}' is listed more than once")]
    DuplicateTarget { target: String },

    /// Blank target identifier
    #[error("Target list contains an empty identifier")]
    EmptyTarget,

    /// Identifier that is not a plain `arch-os[-abi]` triple
    #[error("Invalid target '{target}': expected a triple such as 'x86_64-linux-musl'")]
    InvalidTarget { target: String },

    /// No version could be discovered
    #[error("No version found in '{path}'. Pass --release-version to set one explicitly.")]
    VersionNotFound { path: PathBuf },

    /// Version string is not semver
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Unknown native package format
    #[error("Unsupported package format '{format}' (expected one of: deb, rpm, pacman)")]
    UnsupportedFormat { format: String },
}

/// Compiler invocation errors, recorded per target
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Toolchain executable not found on PATH
    #[error("Toolchain not found: {toolchain}")]
    ToolchainNotFound { toolchain: String },

    /// Toolchain could not be spawned
    #[error("Failed to run '{command}': {error}")]
    SpawnFailed { command: String, error: String },

    /// Toolchain exited non-zero
    #[error("Build failed for '{target}' (exit code {code:?})")]
    CompilerFailed { target: String, code: Option<i32> },

    /// Toolchain succeeded but the binary never appeared
    #[error("Build for '{target}' produced no binary at '{path}'")]
    MissingArtifact { target: String, path: PathBuf },

    /// Scratch directory could not be prepared
    #[error("Failed to prepare scratch directory '{path}': {error}")]
    Scratch { path: PathBuf, error: String },
}

/// Archive creation errors, recorded per target
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackagingError {
    /// Binary to archive could not be read
    #[error("Failed to read binary '{path}': {error}")]
    ReadBinary { path: PathBuf, error: String },

    /// Archive could not be written
    #[error("Failed to write archive '{path}': {error}")]
    WriteArchive { path: PathBuf, error: String },

    /// Build result handed over without a binary
    #[error("No binary available for '{target}'")]
    NoBinary { target: String },

    /// Expected archive from an earlier run is absent
    #[error("Archive '{path}' not found; run 'mufiz-release release' first")]
    MissingArchive { path: PathBuf },
}

/// External packager errors, recorded per target and format
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NativePackageError {
    /// Packager executable not found on PATH
    #[error("Packager not found: {packager}")]
    PackagerNotFound { packager: String },

    /// Packager could not be spawned
    #[error("Failed to run '{command}': {error}")]
    SpawnFailed { command: String, error: String },

    /// Packager exited non-zero
    #[error("{format} packaging failed for '{target}' (exit code {code:?})")]
    PackagerFailed {
        target: String,
        format: String,
        code: Option<i32>,
    },

    /// Packager succeeded but its output was not found
    #[error("{format} package for '{target}' not found after packaging")]
    OutputMissing { target: String, format: String },

    /// Source archive missing
    #[error("Archive '{path}' does not exist")]
    ArchiveMissing { path: PathBuf },

    /// Output could not be relocated or work dir created
    #[error("IO error for '{path}': {error}")]
    Io { path: PathBuf, error: String },

    /// Packaging worker panicked
    #[error("Packaging aborted for '{target}': {error}")]
    Aborted { target: String, error: String },
}

/// Filesystem errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to remove directory
    #[error("Failed to remove directory '{path}': {error}")]
    RemoveDir { path: PathBuf, error: String },

    /// Failed to move file
    #[error("Failed to move '{from}' to '{to}': {error}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        error: String,
    },

    /// Failed to read directory or file
    #[error("Failed to read '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },
}

/// Why a single target did not produce an archive
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TargetFailure {
    /// Compilation step failed
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Archive step failed
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// Worker panicked or was cancelled
    #[error("Worker aborted: {0}")]
    Aborted(String),
}

/// Top-level mufiz-release error type
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem error
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    /// One or more targets failed
    #[error("{failed} of {total} targets failed")]
    TargetsFailed { failed: usize, total: usize },
}
