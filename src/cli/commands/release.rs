//! Release command implementation
//!
//! Implements `mufiz-release release`: build and archive every target,
//! package the Linux archives natively, then collect and checksum.

use anyhow::Result;

use super::{apply_build_args, resolve_config, BuildArgs, PackageArgs, ProjectArgs};
use crate::cli::output::{self, create_build_bar};
use crate::core::pipeline::Pipeline;
use crate::core::report::ReleaseReport;
use crate::error::ReleaseError;

/// Execute the release command
pub async fn execute(project: &ProjectArgs, build: &BuildArgs, package: &PackageArgs) -> Result<()> {
    let catalog = project.catalog.load_catalog()?;
    let config = apply_build_args(resolve_config(project, package, &catalog)?, build);

    tracing::info!(
        "Releasing {} {} for {} targets with {} workers",
        config.product,
        config.version,
        catalog.len(),
        config.jobs
    );
    output::info(&format!(
        "Building {} {} for {} target(s)",
        config.product,
        config.version,
        catalog.len()
    ));

    let toolchain = build.toolchain(&config.project_dir);
    let progress = create_build_bar(catalog.len() as u64);
    let pipeline =
        Pipeline::new(config, toolchain, package.packager()).with_progress(progress.clone());

    let report = pipeline.run(&catalog).await;
    progress.finish_and_clear();
    finish(&report?)
}

/// Print the report and turn failures into an error exit
pub(super) fn finish(report: &ReleaseReport) -> Result<()> {
    output::print_report(report)?;
    if report.has_failures() {
        return Err(ReleaseError::TargetsFailed {
            failed: report.failed_count(),
            total: report.targets.len(),
        }
        .into());
    }
    Ok(())
}
