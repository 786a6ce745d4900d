//! Project configuration (`wpack.toml`) parsing and validation.
//!
//! The configuration file lives at the project root and is loaded exactly
//! once per build; it is never mutated afterwards. Validation happens at load
//! time, before any filesystem mutation, so a broken configuration can never
//! leave a half-written build tree behind.
//!
//! # Format
//!
//! ```toml
//! plugin_id = "acme-app"
//!
//! [build]
//! output_dir = "dist"
//! composer_cleanup = true
//! ignore_platform_reqs = false
//!
//! [build.prefixer]
//! enabled = true
//! namespace_prefix = "AcmeApp\\Deps"
//! include_packages = ["acme/http", "acme/router"]
//! ```
//!
//! Only `plugin_id` is required. When `build.prefixer.enabled` is set,
//! `namespace_prefix` becomes required as well; it is normalized by stripping
//! trailing `\` separators. Omitting `include_packages` selects every
//! installed package ([`PackageScope::Auto`]).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{CONFIG_FILE, DEFAULT_OUTPUT_DIR, NAMESPACE_SEPARATOR};
use crate::core::WpackError;

/// Which vendor packages have their namespaces rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageScope {
    /// Every installed package.
    Auto,
    /// Exactly the listed packages. Entries that turn out not to be
    /// installed produce a warning, not an error.
    Only(Vec<String>),
}

/// The parsed `wpack.toml` file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WpackConfig {
    /// Plugin identifier: names the build tree (`dist/<plugin_id>/`), the
    /// archive (`dist/<plugin_id>.zip`), and the entry file
    /// (`<plugin_id>.php`). Required and non-empty.
    pub plugin_id: String,

    /// Build settings; every field has a default.
    #[serde(default)]
    pub build: BuildSection,
}

/// The `[build]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildSection {
    /// Output directory, relative to the project root.
    pub output_dir: String,

    /// Delete `composer.json`/`composer.lock` from the build tree after
    /// installation. The distributable does not need them.
    pub composer_cleanup: bool,

    /// Pass `--ignore-platform-reqs` to the dependency installer. The CLI
    /// flag of the same name forces this on.
    pub ignore_platform_reqs: bool,

    /// Namespace prefixer settings.
    pub prefixer: PrefixerSection,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            composer_cleanup: true,
            ignore_platform_reqs: false,
            prefixer: PrefixerSection::default(),
        }
    }
}

/// The `[build.prefixer]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PrefixerSection {
    /// Whether bundled namespaces are rewritten at all.
    pub enabled: bool,

    /// The per-plugin namespace prefix. Required when `enabled`; trailing
    /// separators are stripped during load.
    pub namespace_prefix: Option<String>,

    /// Packages whose namespaces move under the prefix. Omitted means every
    /// installed package.
    pub include_packages: Option<Vec<String>>,
}

impl WpackConfig {
    /// Loads and validates `wpack.toml` from the project root.
    ///
    /// # Errors
    ///
    /// [`WpackError::ConfigNotFound`] when the file is absent, and
    /// [`WpackError::ConfigInvalid`] for syntax errors, an empty
    /// `plugin_id`, or a missing/empty `namespace_prefix` while the
    /// prefixer is enabled.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(CONFIG_FILE);
        if !path.exists() {
            return Err(WpackError::ConfigNotFound {
                path: project_root.display().to_string(),
            }
            .into());
        }

        let content = crate::utils::fs::read_text_file(&path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| WpackError::ConfigInvalid {
            reason: e.to_string(),
        })?;

        config.normalize();
        config.validate()?;
        tracing::debug!(
            target: "config",
            "loaded {} (plugin_id={}, prefixer={})",
            path.display(),
            config.plugin_id,
            config.build.prefixer.enabled
        );
        Ok(config)
    }

    /// Strips trailing namespace separators from the configured prefix.
    fn normalize(&mut self) {
        if let Some(prefix) = &self.build.prefixer.namespace_prefix {
            let cleaned = prefix.trim_end_matches(NAMESPACE_SEPARATOR).to_string();
            self.build.prefixer.namespace_prefix = Some(cleaned);
        }
    }

    fn validate(&self) -> Result<(), WpackError> {
        if self.plugin_id.trim().is_empty() {
            return Err(WpackError::ConfigInvalid {
                reason: "'plugin_id' must be a non-empty string".to_string(),
            });
        }
        if self.build.prefixer.enabled && self.namespace_prefix().is_none() {
            return Err(WpackError::ConfigInvalid {
                reason: "'build.prefixer.namespace_prefix' is required when the prefixer is enabled"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// The active namespace prefix, or `None` when prefixing is disabled or
    /// the prefix normalizes to the empty string.
    pub fn namespace_prefix(&self) -> Option<&str> {
        if !self.build.prefixer.enabled {
            return None;
        }
        self.build
            .prefixer
            .namespace_prefix
            .as_deref()
            .filter(|p| !p.is_empty())
    }

    /// The configured prefixing scope.
    pub fn scope(&self) -> PackageScope {
        match &self.build.prefixer.include_packages {
            Some(packages) => PackageScope::Only(packages.clone()),
            None => PackageScope::Auto,
        }
    }
}
