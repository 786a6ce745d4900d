//! Namespace mapping resolution.
//!
//! Decides *which* packages get rewritten ([`resolve_scope`]) and *what* the
//! rewrites are ([`NamespaceTable`]). The table is rebuilt from package
//! metadata on every run; nothing is persisted between builds, so
//! idempotence is re-derived from content inspection rather than stored
//! history.

pub mod rewrite;

pub use rewrite::{NamespaceRewriter, RewriteMode};

use anyhow::Result;
use std::path::Path;

use crate::composer::PackageDescriptor;
use crate::config::PackageScope;
use crate::constants::NAMESPACE_SEPARATOR;

/// Resolves the set of packages whose namespaces get rewritten.
///
/// `Auto` takes every installed package verbatim. An explicit list is
/// returned exactly as configured; entries that are not installed produce a
/// warning each (not an error) so a stale `include_packages` line cannot
/// silently change the build's meaning.
pub fn resolve_scope(installed: &[String], configured: &PackageScope) -> (Vec<String>, Vec<String>) {
    match configured {
        PackageScope::Auto => (installed.to_vec(), Vec::new()),
        PackageScope::Only(packages) => {
            let warnings = packages
                .iter()
                .filter(|p| !installed.contains(p))
                .map(|p| {
                    format!(
                        "package '{p}' is listed in build.prefixer.include_packages but is not installed"
                    )
                })
                .collect();
            (packages.clone(), warnings)
        }
    }
}

/// The namespace mapping table for one build run: cleaned original namespace
/// → prefixed namespace.
///
/// Keys are unique; a later insert of an existing key is a no-op (identical
/// packages yield identical mappings, so first writer wins).
#[derive(Debug, Default)]
pub struct NamespaceTable {
    entries: Vec<(String, String)>,
}

impl NamespaceTable {
    /// An empty table; rewriting with it is the identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `original` (cleaned of trailing separators) mapped to
    /// `prefix\original`. Empty namespaces and duplicate keys are ignored.
    pub fn insert(&mut self, original: &str, prefix: &str) {
        let cleaned = original.trim_end_matches(NAMESPACE_SEPARATOR);
        if cleaned.is_empty() || self.entries.iter().any(|(k, _)| k == cleaned) {
            return;
        }
        let prefixed = format!("{prefix}{NAMESPACE_SEPARATOR}{cleaned}");
        self.entries.push((cleaned.to_string(), prefixed));
    }

    /// Whether any namespaces are mapped at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of mapped namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries ordered by descending original length (ties broken
    /// lexicographically for determinism). The most specific namespace must
    /// be rewritten first so a shorter sibling can never match inside a
    /// longer, already-correct one.
    pub fn entries_longest_first(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        ordered
    }

    /// Builds the table for every package in scope.
    ///
    /// Each scope package contributes its own namespace map; additionally,
    /// each of its *direct* dependencies contributes its map when that
    /// dependency is itself in scope. The walk is exactly one level deep.
    /// Scope entries without a directory under `vendor_dir` are skipped
    /// (the scope resolver already warned about them).
    pub fn build(scope: &[String], vendor_dir: &Path, prefix: &str) -> Result<Self> {
        let mut table = Self::new();

        for package_id in scope {
            let package_dir = vendor_dir.join(package_id);
            if !package_dir.is_dir() {
                tracing::debug!(target: "prefixer", "skipping absent package {package_id}");
                continue;
            }
            let descriptor = PackageDescriptor::load(package_id, &package_dir)?;
            for (namespace, _) in &descriptor.namespace_map {
                table.insert(namespace, prefix);
            }

            for dependency_id in &descriptor.dependency_ids {
                if !scope.contains(dependency_id) {
                    continue;
                }
                let dependency_dir = vendor_dir.join(dependency_id);
                if !dependency_dir.is_dir() {
                    continue;
                }
                let dependency = PackageDescriptor::load(dependency_id, &dependency_dir)?;
                for (namespace, _) in &dependency.namespace_map {
                    table.insert(namespace, prefix);
                }
            }
        }

        tracing::debug!(target: "prefixer", "mapping table holds {} namespace(s)", table.len());
        Ok(table)
    }
}
