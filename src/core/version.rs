//! Release version discovery
//!
//! The version comes from `--release-version` when given, otherwise from the
//! `.version = "x.y.z"` field of the project's `build.zig.zon`.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use semver::Version;

use crate::config::defaults::VERSION_FILE;
use crate::error::ConfigError;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"\.version\s*=\s*"([^"]+)""#).expect("Invalid version regex"))
}

/// Extract the package version from `build.zig.zon` content
pub fn extract_version(zon: &str) -> Option<String> {
    version_pattern()
        .captures(zon)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check that a version string is valid semver
pub fn validate_version(version: &str) -> Result<Version, ConfigError> {
    Version::parse(version).map_err(|e| ConfigError::InvalidVersion {
        version: version.to_string(),
        reason: e.to_string(),
    })
}

/// Resolve the release version for a project
pub fn resolve_version(explicit: Option<&str>, project_dir: &Path) -> Result<String, ConfigError> {
    if let Some(version) = explicit {
        validate_version(version)?;
        return Ok(version.to_string());
    }

    let path = project_dir.join(VERSION_FILE);
    if !path.exists() {
        return Err(ConfigError::VersionNotFound { path });
    }
    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
        path: path.clone(),
        error: e.to_string(),
    })?;
    let version = extract_version(&content).ok_or(ConfigError::VersionNotFound { path })?;
    validate_version(&version)?;
    tracing::debug!("Using version {version} from {VERSION_FILE}");
    Ok(version)
}
