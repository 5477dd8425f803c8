//! Build targets and the target catalog
//!
//! The catalog is read from `targets.json` (`{ "targets": [...] }`) or an
//! equivalent TOML file. Targets keep their file order and must be unique.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A zig target triple such as `x86_64-linux-musl`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Create a target from its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// CPU architecture component (`x86_64` in `x86_64-linux-musl`)
    pub fn arch(&self) -> &str {
        self.0.split('-').next().unwrap_or_default()
    }

    /// Operating system component (`linux` in `x86_64-linux-musl`)
    pub fn os(&self) -> Option<&str> {
        self.0.split('-').nth(1)
    }

    /// Whether this target produces a Windows executable
    pub fn is_windows(&self) -> bool {
        self.os() == Some("windows")
    }

    /// Whether this target produces a WebAssembly module
    pub fn is_wasm(&self) -> bool {
        matches!(self.arch(), "wasm32" | "wasm64")
    }

    /// Executable suffix the toolchain gives binaries for this target
    pub fn exe_suffix(&self) -> &'static str {
        if self.is_windows() {
            ".exe"
        } else if self.is_wasm() {
            ".wasm"
        } else {
            ""
        }
    }
}

fn triple_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.]*(-[A-Za-z0-9_.]+)*$").expect("Invalid target regex")
    })
}

/// Whether `id` is a plain triple, usable as a single path component
pub fn is_valid_triple(id: &str) -> bool {
    triple_pattern().is_match(id)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// On-disk catalog layout
#[derive(Debug, Deserialize)]
struct CatalogFile {
    targets: Option<Vec<String>>,
    restricted_target: Option<String>,
}

/// Ordered, duplicate-free set of build targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetCatalog {
    targets: Vec<Target>,
    restricted_target: Option<String>,
}

impl TargetCatalog {
    /// Build a catalog from identifiers, rejecting blanks and duplicates
    pub fn from_ids<I, S>(ids: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for id in ids {
            let id: String = id.into();
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(ConfigError::EmptyTarget);
            }
            if !is_valid_triple(&id) {
                return Err(ConfigError::InvalidTarget { target: id });
            }
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateTarget { target: id });
            }
            targets.push(Target::new(id));
        }
        Ok(Self {
            targets,
            restricted_target: None,
        })
    }

    /// Load the catalog from a JSON or TOML file (chosen by extension)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let parsed: CatalogFile = if is_toml {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?
        };

        let ids = parsed.targets.ok_or_else(|| ConfigError::MissingField {
            path: path.to_path_buf(),
            field: "targets".to_string(),
        })?;

        let mut catalog = Self::from_ids(ids)?;
        catalog.restricted_target = parsed.restricted_target;
        tracing::debug!(
            "Loaded {} targets from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Targets in declaration order
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Restricted-profile target override, if the catalog declares one
    pub fn restricted_target(&self) -> Option<&str> {
        self.restricted_target.as_deref()
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the catalog has no targets
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
