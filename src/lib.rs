//! mufiz-release - Multi-target release builder for MufiZ
//!
//! This library cross-compiles the MufiZ binary for a matrix of targets,
//! archives every build, and turns Linux archives into native packages
//! through an external packager.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Release pipeline logic
//! - [`infra`] - Infrastructure layer (filesystem, processes, external tools)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
