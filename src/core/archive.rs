//! Release archives
//!
//! Every successful build becomes `<product>_<version>_<target>.zip` holding
//! a single top-level executable. Windows entries always carry `.exe` and
//! wasm entries `.wasm`.
//! Archives are written under a temporary name and renamed into place.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::compiler::BuildResult;
use crate::core::target::Target;
use crate::error::PackagingError;

/// Archive file extension
pub const ARCHIVE_EXT: &str = "zip";

/// A written release archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Target the archived binary was built for
    pub target: Target,
    /// Release version
    pub version: String,
    /// Location of the archive
    pub path: PathBuf,
}

/// Archive file name for a `(version, target)` pair
pub fn archive_name(product: &str, version: &str, target: &Target) -> String {
    format!("{product}_{version}_{target}.{ARCHIVE_EXT}")
}

/// Name of the single entry inside the archive
pub fn entry_name(binary: &Path, target: &Target) -> String {
    let base = binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = target.exe_suffix();
    if suffix.is_empty() || base.ends_with(suffix) {
        base
    } else {
        format!("{base}{suffix}")
    }
}

/// Turns build results into archives in the output directory
#[derive(Debug, Clone)]
pub struct ArtifactPackager {
    product: String,
    out_dir: PathBuf,
}

impl ArtifactPackager {
    /// Create a packager writing into `out_dir`
    pub fn new(product: &str, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            product: product.to_string(),
            out_dir: out_dir.into(),
        }
    }

    /// Expected archive location for a target
    pub fn archive_path(&self, version: &str, target: &Target) -> PathBuf {
        self.out_dir.join(archive_name(&self.product, version, target))
    }

    /// Archive a successful build and delete the source binary
    pub fn package(&self, result: &BuildResult, version: &str) -> Result<Archive, PackagingError> {
        let target = &result.target;
        let binary = result.binary().ok_or_else(|| PackagingError::NoBinary {
            target: target.to_string(),
        })?;

        let path = self.archive_path(version, target);
        let entry = entry_name(binary, target);
        let partial = path.with_extension(format!("{ARCHIVE_EXT}.partial"));

        if let Err(error) = write_archive(binary, &entry, &partial) {
            let _ = std::fs::remove_file(&partial);
            return Err(match error {
                ArchiveWriteError::Read(e) => PackagingError::ReadBinary {
                    path: binary.to_path_buf(),
                    error: e,
                },
                ArchiveWriteError::Write(e) => PackagingError::WriteArchive {
                    path: path.clone(),
                    error: e,
                },
            });
        }

        std::fs::rename(&partial, &path).map_err(|e| PackagingError::WriteArchive {
            path: path.clone(),
            error: e.to_string(),
        })?;

        if let Err(e) = std::fs::remove_file(binary) {
            tracing::warn!("Failed to remove {}: {e}", binary.display());
        }

        tracing::info!("Archived {target} as {}", path.display());
        Ok(Archive {
            target: target.clone(),
            version: version.to_string(),
            path,
        })
    }
}

enum ArchiveWriteError {
    Read(String),
    Write(String),
}

fn write_archive(binary: &Path, entry: &str, dest: &Path) -> Result<(), ArchiveWriteError> {
    let source = File::open(binary).map_err(|e| ArchiveWriteError::Read(e.to_string()))?;
    let mut source = BufReader::new(source);

    let file = File::create(dest).map_err(|e| ArchiveWriteError::Write(e.to_string()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);

    zip.start_file(entry, options)
        .map_err(|e| ArchiveWriteError::Write(e.to_string()))?;
    std::io::copy(&mut source, &mut zip).map_err(|e| ArchiveWriteError::Write(e.to_string()))?;
    let mut writer = zip
        .finish()
        .map_err(|e| ArchiveWriteError::Write(e.to_string()))?;
    std::io::Write::flush(&mut writer).map_err(|e| ArchiveWriteError::Write(e.to_string()))?;
    Ok(())
}
