//! Core release logic
//!
//! Side effects go through [`crate::infra`]; the external tools are reached
//! only via the [`compiler::Compiler`] and [`native::ExternalPackager`] seams.
//!
//! # Submodules
//!
//! - [`target`] - Targets and the target catalog
//! - [`version`] - Release version discovery
//! - [`compiler`] - Per-target compiler invocation and post-build barrier
//! - [`archive`] - Release archive creation
//! - [`scheduler`] - Bounded concurrent execution over targets
//! - [`native`] - Native Linux package building
//! - [`collector`] - Loose package collection
//! - [`checksum`] - Checksum manifest
//! - [`report`] - Run report
//! - [`pipeline`] - Stage composition

pub mod archive;
pub mod checksum;
pub mod collector;
pub mod compiler;
pub mod native;
pub mod pipeline;
pub mod report;
pub mod scheduler;
pub mod target;
pub mod version;
