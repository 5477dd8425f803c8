//! Checksums command implementation
//!
//! Implements `mufiz-release checksums` to rewrite the manifest.

use anyhow::{bail, Context, Result};

use super::OutputArgs;
use crate::cli::output::{self, status, OutputConfig};
use crate::config::defaults::CHECKSUM_FILE;
use crate::core::checksum::write_checksums;

/// Execute the checksums command
pub fn execute(args: &OutputArgs) -> Result<()> {
    let out_dir = args.out_dir();
    if !out_dir.is_dir() {
        bail!(
            "Output directory {} does not exist. Run 'mufiz-release release' first.",
            out_dir.display()
        );
    }

    let path = write_checksums(&out_dir, CHECKSUM_FILE)
        .with_context(|| format!("Failed to write checksums in {}", out_dir.display()))?;

    if OutputConfig::global().json {
        return output::print_json(&serde_json::json!({ "checksums": path }));
    }
    output::info(&format!("{} Wrote {}", status::SUCCESS, path.display()));
    Ok(())
}
