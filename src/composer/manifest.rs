//! Root manifest preparation and installed-package inventory.
//!
//! Before the installer runs, the project's `composer.json` is adjusted for
//! bundling: development dependencies are dropped and path-repository
//! symlinking is disabled, because the archive step cannot follow symlinks
//! and the build tree must hold real file copies. The adjusted manifest is
//! written into the build tree and `composer install` runs there.
//!
//! Afterwards the installed set is inventoried from Composer's own
//! `vendor/composer/installed.json`; if that file is missing or lists
//! nothing, a two-level `vendor/<group>/<name>` directory scan stands in.

use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::composer::InstalledSet;
use crate::constants::{
    COMPOSER_LOCKFILE, COMPOSER_MANIFEST, COMPOSER_METADATA_DIR, INSTALLED_METADATA, VENDOR_DIR,
};
use crate::core::WpackError;
use crate::utils::fs::{read_text_file, write_text_file};

/// Prepares the project manifest for production-only installation and writes
/// it into the build tree.
///
/// Returns `false` when the project has no `composer.json` at all: a plugin
/// without third-party dependencies is a perfectly valid build, the
/// materialization step is simply skipped.
///
/// # Errors
///
/// [`WpackError::ManifestInvalid`] when the manifest exists but cannot be
/// parsed.
pub fn prepare_manifest(project_root: &Path, build_dir: &Path) -> Result<bool> {
    let manifest_path = project_root.join(COMPOSER_MANIFEST);
    if !manifest_path.exists() {
        tracing::debug!(target: "composer", "no composer.json, skipping dependency materialization");
        return Ok(false);
    }

    let content = read_text_file(&manifest_path)?;
    let mut manifest: Value =
        serde_json::from_str(&content).map_err(|e| WpackError::ManifestInvalid {
            path: manifest_path.display().to_string(),
            reason: e.to_string(),
        })?;

    if let Some(obj) = manifest.as_object_mut() {
        obj.remove("require-dev");
    }
    disable_path_symlinks(&mut manifest);

    let adjusted = serde_json::to_string_pretty(&manifest)?;
    write_text_file(&build_dir.join(COMPOSER_MANIFEST), &adjusted)?;
    tracing::debug!(target: "composer", "wrote adjusted manifest into {}", build_dir.display());
    Ok(true)
}

/// Forces `options.symlink = false` on every path repository.
fn disable_path_symlinks(manifest: &mut Value) {
    let Some(repositories) = manifest.get_mut("repositories").and_then(Value::as_array_mut) else {
        return;
    };
    for repository in repositories {
        let is_path = repository.get("type").and_then(Value::as_str) == Some("path");
        if !is_path {
            continue;
        }
        let Some(obj) = repository.as_object_mut() else { continue };
        let options = obj
            .entry("options".to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Some(options) = options.as_object_mut() {
            options.insert("symlink".to_string(), Value::Bool(false));
        }
    }
}

/// Enumerates the installed package identifiers under the build tree.
///
/// Reads `vendor/composer/installed.json` (both the Composer 2 object form
/// and the legacy top-level array) and falls back to a directory scan when
/// the metadata is absent or empty.
pub fn inventory_installed(build_dir: &Path) -> Result<InstalledSet> {
    let vendor_dir = build_dir.join(VENDOR_DIR);
    let metadata_path = vendor_dir.join(COMPOSER_METADATA_DIR).join(INSTALLED_METADATA);

    if metadata_path.exists() {
        let content = read_text_file(&metadata_path)?;
        if let Ok(metadata) = serde_json::from_str::<Value>(&content) {
            let packages = match &metadata {
                Value::Object(obj) => obj.get("packages").and_then(Value::as_array).cloned(),
                Value::Array(list) => Some(list.clone()),
                _ => None,
            };
            if let Some(packages) = packages {
                let mut ids: Vec<String> = packages
                    .iter()
                    .filter_map(|p| p.get("name").and_then(Value::as_str))
                    .map(ToString::to_string)
                    .collect();
                if !ids.is_empty() {
                    ids.sort();
                    return Ok(ids);
                }
            }
        }
        tracing::debug!(
            target: "composer",
            "installed.json unusable, falling back to a vendor directory scan"
        );
    }

    scan_vendor_tree(&vendor_dir)
}

/// Two-level `vendor/<group>/<name>` scan, skipping Composer's own metadata
/// and binary directories.
fn scan_vendor_tree(vendor_dir: &Path) -> Result<InstalledSet> {
    let mut ids = Vec::new();
    if !vendor_dir.is_dir() {
        return Ok(ids);
    }

    for group_entry in fs::read_dir(vendor_dir)? {
        let group_entry = group_entry?;
        if !group_entry.file_type()?.is_dir() {
            continue;
        }
        let group = group_entry.file_name().to_string_lossy().to_string();
        if group == COMPOSER_METADATA_DIR || group == "bin" || group.starts_with('.') {
            continue;
        }
        for package_entry in fs::read_dir(group_entry.path())? {
            let package_entry = package_entry?;
            if !package_entry.file_type()?.is_dir() {
                continue;
            }
            let name = package_entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            ids.push(format!("{group}/{name}"));
        }
    }

    ids.sort();
    Ok(ids)
}

/// Removes the manifest and lockfile from the build tree. The distributable
/// does not ship them.
pub fn cleanup_manifest(build_dir: &Path) -> Result<()> {
    for file in [COMPOSER_MANIFEST, COMPOSER_LOCKFILE] {
        let path = build_dir.join(file);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::debug!(target: "composer", "removed {}", path.display());
        }
    }
    Ok(())
}
