//! Release checksum manifest
//!
//! Writes `SHA256SUMS` next to the release artifacts in the usual
//! `<hex>  <file>` layout, sorted by file name.

use std::fmt::Write as _;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::core::archive::ARCHIVE_EXT;
use crate::core::collector::is_package_file;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Whether a file belongs in the checksum manifest
fn is_release_artifact(name: &str) -> bool {
    name.ends_with(&format!(".{ARCHIVE_EXT}")) || is_package_file(name)
}

/// SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> Result<String, FilesystemError> {
    let err = |e: std::io::Error| FilesystemError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    let mut reader = BufReader::new(File::open(path).map_err(err)?);
    let mut hasher = Sha256::new();
    std::io::copy(&mut reader, &mut hasher).map_err(err)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Write the checksum manifest for every artifact in `out_dir`
pub fn write_checksums(out_dir: &Path, file_name: &str) -> Result<PathBuf, FilesystemError> {
    let mut names: Vec<String> = std::fs::read_dir(out_dir)
        .map_err(|e| FilesystemError::Read {
            path: out_dir.to_path_buf(),
            error: e.to_string(),
        })?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| is_release_artifact(name))
        .collect();
    names.sort();

    let mut content = String::new();
    for name in &names {
        let digest = sha256_file(&out_dir.join(name))?;
        let _ = writeln!(content, "{digest}  {name}");
    }

    let path = out_dir.join(file_name);
    filesystem::write_file(&path, &content)?;
    tracing::info!("Wrote {} checksums to {}", names.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // sha256("abc")
    const ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_sha256_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.zip");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(sha256_file(&path).unwrap(), ABC);
    }

    #[test]
    fn test_manifest_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mufiz_1.0.0_x86_64-linux.zip"), "abc").unwrap();
        std::fs::write(dir.path().join("mufiz_1.0.0_aarch64-macos.zip"), "abc").unwrap();
        std::fs::write(dir.path().join("mufiz_1.0.0_x86_64-linux.deb"), "abc").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "abc").unwrap();

        let path = write_checksums(dir.path(), "SHA256SUMS").unwrap();
        let lines: Vec<String> = std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();

        assert_eq!(
            lines,
            vec![
                format!("{ABC}  mufiz_1.0.0_aarch64-macos.zip"),
                format!("{ABC}  mufiz_1.0.0_x86_64-linux.deb"),
                format!("{ABC}  mufiz_1.0.0_x86_64-linux.zip"),
            ]
        );
    }

    #[test]
    fn test_manifest_excludes_itself() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("mufiz_1.0.0_x86_64-linux.zip"), "abc").unwrap();
        write_checksums(dir.path(), "SHA256SUMS").unwrap();
        let path = write_checksums(dir.path(), "SHA256SUMS").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap().lines().count(), 1);
    }
}
