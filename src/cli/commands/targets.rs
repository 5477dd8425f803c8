//! Targets command implementation
//!
//! Implements `mufiz-release targets` to show the catalog, the build profile
//! each target gets, and its native package architectures.

use anyhow::Result;
use serde::Serialize;

use super::CatalogArgs;
use crate::cli::output::{self, OutputConfig};
use crate::config::defaults::RESTRICTED_TARGET;
use crate::core::compiler::BuildProfile;
use crate::core::native::{deb_arch, rpm_arch};
use crate::core::target::{Target, TargetCatalog};

/// One catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetRow {
    /// Target identifier
    pub target: Target,
    /// Build profile name
    pub profile: String,
    /// Debian architecture, if packaged
    pub deb: Option<&'static str>,
    /// RPM architecture, if packaged
    pub rpm: Option<&'static str>,
}

/// Describe every catalog target
pub fn rows(catalog: &TargetCatalog) -> Vec<TargetRow> {
    let restricted = catalog.restricted_target().unwrap_or(RESTRICTED_TARGET);
    catalog
        .targets()
        .iter()
        .map(|target| TargetRow {
            target: target.clone(),
            profile: BuildProfile::for_target(target, restricted).to_string(),
            deb: deb_arch(target),
            rpm: rpm_arch(target),
        })
        .collect()
}

/// Execute the targets command
pub fn execute(args: &CatalogArgs) -> Result<()> {
    let catalog = args.load_catalog()?;
    let rows = rows(&catalog);

    if OutputConfig::global().json {
        return output::print_json(&rows);
    }

    let width = rows
        .iter()
        .map(|r| r.target.as_str().len())
        .max()
        .unwrap_or(0)
        .max("TARGET".len());
    println!("{:<width$}  {:<10}  {:<8}  RPM", "TARGET", "PROFILE", "DEB");
    for row in &rows {
        println!(
            "{:<width$}  {:<10}  {:<8}  {}",
            row.target.as_str(),
            row.profile,
            row.deb.unwrap_or("-"),
            row.rpm.unwrap_or("-"),
        );
    }
    Ok(())
}
