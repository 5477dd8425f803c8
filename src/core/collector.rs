//! Loose package collection
//!
//! Moves package files left in a working directory into the output
//! directory. Only the top level of the source directory is swept.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::FilesystemError;
use crate::infra::filesystem;

/// File extensions treated as native packages
pub const PACKAGE_EXTENSIONS: &[&str] = &["deb", "rpm", "pkg.tar.zst", "snap"];

/// Whether a file name looks like a native package
pub fn is_package_file(name: &str) -> bool {
    PACKAGE_EXTENSIONS
        .iter()
        .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
}

/// Move loose packages from `source_dir` into `out_dir`
///
/// Returns the new locations. Running again with nothing new is a no-op.
pub fn collect(source_dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    if same_dir(source_dir, out_dir) {
        return Ok(Vec::new());
    }

    let mut moved = Vec::new();
    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| FilesystemError::Read {
            path: source_dir.to_path_buf(),
            error: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !is_package_file(&name) {
            continue;
        }

        let dest = out_dir.join(entry.file_name());
        filesystem::move_file(entry.path(), &dest)?;
        tracing::info!("Collected {}", dest.display());
        moved.push(dest);
    }

    Ok(moved)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
