//! Composer package metadata.
//!
//! Each vendor package describes itself through its own `composer.json`: a
//! PSR-4 autoload map (namespace → source root) and a `require` list naming
//! its direct dependencies. [`PackageDescriptor`] is the parsed, immutable
//! form of that file; the namespace resolver unions descriptors into the
//! mapping table that drives rewriting.
//!
//! Platform requirements (`php`, `ext-*`, `lib-*`, ...) appear in `require`
//! lists but are not packages; [`is_platform_requirement`] filters them out
//! of every dependency walk.

pub mod installer;
pub mod manifest;

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::constants::{COMPOSER_MANIFEST, NAMESPACE_SEPARATOR};
use crate::core::WpackError;

/// Identifiers of the packages the installer materialized, in `vendor/name`
/// form.
pub type InstalledSet = Vec<String>;

/// A vendor package's own metadata, built once from its `composer.json` and
/// immutable after construction.
#[derive(Debug, Clone)]
pub struct PackageDescriptor {
    /// Package identifier (`vendor/name`).
    pub id: String,
    /// Absolute path of the package directory.
    pub root_path: PathBuf,
    /// Declared PSR-4 namespaces, cleaned of trailing separators, paired
    /// with their source roots relative to the package directory.
    pub namespace_map: Vec<(String, String)>,
    /// Direct dependencies from `require`, with platform requirements
    /// removed.
    pub dependency_ids: Vec<String>,
}

impl PackageDescriptor {
    /// Reads a package's `composer.json`.
    ///
    /// A manifest without an `autoload.psr-4` section yields an empty
    /// namespace map. That is not an error; plenty of packages autoload by
    /// classmap or files only.
    ///
    /// # Errors
    ///
    /// [`WpackError::PackageMetadataMissing`] when the file is absent,
    /// [`WpackError::PackageMetadataInvalid`] when it cannot be parsed.
    pub fn load(id: &str, root_path: &Path) -> Result<Self> {
        let manifest_path = root_path.join(COMPOSER_MANIFEST);
        if !manifest_path.exists() {
            return Err(WpackError::PackageMetadataMissing { package: id.to_string() }.into());
        }

        let content = crate::utils::fs::read_text_file(&manifest_path)?;
        let manifest: Value =
            serde_json::from_str(&content).map_err(|e| WpackError::PackageMetadataInvalid {
                package: id.to_string(),
                reason: e.to_string(),
            })?;

        let namespace_map = parse_psr4_map(&manifest);
        let dependency_ids = parse_dependency_ids(&manifest);

        tracing::debug!(
            target: "composer",
            "described {}: {} namespace(s), {} dependency(ies)",
            id,
            namespace_map.len(),
            dependency_ids.len()
        );

        Ok(Self {
            id: id.to_string(),
            root_path: root_path.to_path_buf(),
            namespace_map,
            dependency_ids,
        })
    }
}

/// Whether a `require` entry names the PHP runtime or one of its extension
/// modules rather than an installable package. These never participate in
/// dependency walks.
pub fn is_platform_requirement(name: &str) -> bool {
    name == "php"
        || name.starts_with("php-")
        || name.starts_with("ext-")
        || name.starts_with("lib-")
        || name == "composer-plugin-api"
        || name == "composer-runtime-api"
}

fn parse_psr4_map(manifest: &Value) -> Vec<(String, String)> {
    let Some(psr4) = manifest
        .get("autoload")
        .and_then(|a| a.get("psr-4"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut map = Vec::new();
    for (namespace, path) in psr4 {
        let cleaned = namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        if cleaned.is_empty() {
            // A catch-all PSR-4 entry has no namespace to prefix.
            continue;
        }
        // The source root may be a single path or a list; the first entry is
        // representative, only the namespace key drives rewriting.
        let source_root = match path {
            Value::String(s) => s.clone(),
            Value::Array(list) => list
                .first()
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };
        map.push((cleaned.to_string(), source_root));
    }
    map
}

fn parse_dependency_ids(manifest: &Value) -> Vec<String> {
    let Some(require) = manifest.get("require").and_then(Value::as_object) else {
        return Vec::new();
    };
    require
        .keys()
        .filter(|name| !is_platform_requirement(name.as_str()))
        .cloned()
        .collect()
}
