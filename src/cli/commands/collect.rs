//! Collect command implementation
//!
//! Implements `mufiz-release collect` to sweep stray packages into the
//! output directory.

use std::path::Path;

use anyhow::{Context, Result};

use super::OutputArgs;
use crate::cli::output::{self, status, OutputConfig};
use crate::core::collector;
use crate::infra::filesystem;

/// Execute the collect command
pub fn execute(from: Option<&Path>, args: &OutputArgs) -> Result<()> {
    let source = from.unwrap_or(args.project_dir.as_path());
    let out_dir = args.out_dir();
    filesystem::create_dir_all(&out_dir)?;

    let moved = collector::collect(source, &out_dir)
        .with_context(|| format!("Failed to collect packages from {}", source.display()))?;

    if OutputConfig::global().json {
        return output::print_json(&moved);
    }
    if moved.is_empty() {
        output::info(&format!("{} Nothing to collect", status::SUCCESS));
    } else {
        output::info(&format!("{} Collected {} package(s):", status::SUCCESS, moved.len()));
        for path in &moved {
            output::info(&format!("  {}", path.display()));
        }
    }
    Ok(())
}
