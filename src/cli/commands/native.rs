//! Native command implementation
//!
//! Implements `mufiz-release native`: rebuild native packages from the
//! archives already in the output directory.

use anyhow::Result;

use super::{resolve_config, PackageArgs, ProjectArgs};
use crate::cli::output::{self, create_spinner};
use crate::core::pipeline::PackagingStage;

/// Execute the native command
pub async fn execute(project: &ProjectArgs, package: &PackageArgs) -> Result<()> {
    let catalog = project.catalog.load_catalog()?;
    let config = resolve_config(project, package, &catalog)?;

    output::info(&format!(
        "Packaging {} {} from {}",
        config.product,
        config.version,
        config.out_dir.display()
    ));

    let stage = PackagingStage::new(config, package.packager());

    let spinner = create_spinner("Building native packages");
    let report = stage.run_native_only(&catalog).await;
    spinner.finish_and_clear();
    super::release::finish(&report?)
}
