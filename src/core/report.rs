//! Release report
//!
//! Summarises every target's outcome for display and JSON output.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::archive::Archive;
use crate::core::native::{PackageFormat, PackageResult};
use crate::core::scheduler::TargetOutcomes;
use crate::core::target::Target;

/// Outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Step succeeded
    Ok,
    /// Step failed
    Failed,
}

/// One native package outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    /// Package format
    pub format: PackageFormat,
    /// Outcome
    pub status: Status,
    /// Package path on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&PackageResult> for PackageReport {
    fn from(result: &PackageResult) -> Self {
        match &result.outcome {
            Ok(path) => Self {
                format: result.format,
                status: Status::Ok,
                path: Some(path.clone()),
                error: None,
            },
            Err(e) => Self {
                format: result.format,
                status: Status::Failed,
                path: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// One target's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// Target identifier
    pub target: Target,
    /// Build + archive outcome
    pub status: Status,
    /// Archive path on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Native packages built from the archive
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<PackageReport>,
}

impl TargetReport {
    /// Whether the target or any of its packages failed
    pub fn has_failures(&self) -> bool {
        self.status == Status::Failed
            || self.packages.iter().any(|p| p.status == Status::Failed)
    }
}

/// Report for a whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseReport {
    /// Release version
    pub version: String,
    /// Output directory
    pub out_dir: PathBuf,
    /// Per-target outcomes, in catalog order
    pub targets: Vec<TargetReport>,
    /// Files moved in by the collector
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collected: Vec<PathBuf>,
    /// Checksum manifest, if written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksums: Option<PathBuf>,
}

impl ReleaseReport {
    /// Build a report from archive outcomes and native package results
    pub fn new(
        version: &str,
        out_dir: &Path,
        outcomes: &TargetOutcomes<Archive>,
        packages: &[PackageResult],
    ) -> Self {
        let targets = outcomes
            .entries()
            .iter()
            .map(|(target, outcome)| {
                let packages = packages
                    .iter()
                    .filter(|p| &p.target == target)
                    .map(PackageReport::from)
                    .collect();
                match outcome {
                    Ok(archive) => TargetReport {
                        target: target.clone(),
                        status: Status::Ok,
                        archive: Some(archive.path.clone()),
                        error: None,
                        packages,
                    },
                    Err(e) => TargetReport {
                        target: target.clone(),
                        status: Status::Failed,
                        archive: None,
                        error: Some(e.to_string()),
                        packages,
                    },
                }
            })
            .collect();

        Self {
            version: version.to_string(),
            out_dir: out_dir.to_path_buf(),
            targets,
            collected: Vec::new(),
            checksums: None,
        }
    }

    /// Number of targets with any failure
    pub fn failed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.has_failures()).count()
    }

    /// Whether anything failed
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Number of archives produced
    pub fn archive_count(&self) -> usize {
        self.targets.iter().filter(|t| t.archive.is_some()).count()
    }

    /// Number of native packages produced
    pub fn package_count(&self) -> usize {
        self.targets
            .iter()
            .flat_map(|t| &t.packages)
            .filter(|p| p.status == Status::Ok)
            .count()
    }
}
