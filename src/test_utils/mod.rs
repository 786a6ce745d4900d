//! Test utilities shared by unit and integration tests.
//!
//! Enabled with the `test-utils` feature (the integration suite depends on
//! the crate with that feature turned on). Provides a disk-backed project
//! fixture, a fake dependency installer, and an always-unavailable archive
//! backend so the pipeline's control flow can be exercised without Composer
//! or a real zip file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::archive::ArchiveBackend;
use crate::composer::InstalledSet;
use crate::composer::installer::{DependencyInstaller, InstallOptions};
use crate::core::WpackError;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Respects the `RUST_LOG` environment variable if set, or uses the provided
/// level. Without either, logging stays off.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// A throwaway plugin project on disk.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    /// Creates an empty project directory.
    pub fn new() -> Result<Self> {
        Ok(Self { temp: TempDir::new().context("Failed to create temp project")? })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Writes `wpack.toml`.
    pub fn write_config(&self, content: &str) -> Result<()> {
        self.write_file("wpack.toml", content)
    }

    /// Writes the project `composer.json`.
    pub fn write_composer_manifest(&self, content: &str) -> Result<()> {
        self.write_file("composer.json", content)
    }

    /// Writes a file under `src/`.
    pub fn write_source_file(&self, relative: &str, content: &str) -> Result<()> {
        self.write_file(&format!("src/{relative}"), content)
    }

    /// Writes a file relative to the project root, creating parents.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Reads a file relative to the project root.
    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.temp.path().join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// One vendor package the fake installer materializes.
#[derive(Debug, Clone)]
pub struct FakePackage {
    /// Package identifier (`vendor/name`)
    pub id: String,
    /// Content of the package's `composer.json`
    pub manifest: String,
    /// Source files relative to the package directory
    pub files: Vec<(String, String)>,
}

impl FakePackage {
    /// Shorthand constructor.
    pub fn new(id: &str, manifest: &str, files: &[(&str, &str)]) -> Self {
        Self {
            id: id.to_string(),
            manifest: manifest.to_string(),
            files: files.iter().map(|(p, c)| ((*p).to_string(), (*c).to_string())).collect(),
        }
    }
}

/// Installer fake: materializes a fixed vendor tree instead of invoking
/// Composer, and reports exactly those packages as installed.
#[derive(Debug, Clone, Default)]
pub struct FakeInstaller {
    /// Packages written under `vendor/`
    pub packages: Vec<FakePackage>,
    /// Extra files written under `vendor/composer/` (autoloader tables)
    pub metadata_files: Vec<(String, String)>,
}

impl FakeInstaller {
    /// An installer that materializes the given packages.
    pub fn with_packages(packages: Vec<FakePackage>) -> Self {
        Self { packages, metadata_files: Vec::new() }
    }

    /// Adds a generated autoloader table under `vendor/composer/`.
    #[must_use]
    pub fn with_metadata_file(mut self, name: &str, content: &str) -> Self {
        self.metadata_files.push((name.to_string(), content.to_string()));
        self
    }
}

impl DependencyInstaller for FakeInstaller {
    async fn install(&self, build_dir: &Path, _opts: &InstallOptions) -> Result<InstalledSet> {
        let vendor = build_dir.join("vendor");
        for package in &self.packages {
            let package_dir = vendor.join(&package.id);
            fs::create_dir_all(&package_dir)?;
            fs::write(package_dir.join("composer.json"), &package.manifest)?;
            for (relative, content) in &package.files {
                let path = package_dir.join(relative);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, content)?;
            }
        }

        let metadata_dir = vendor.join("composer");
        fs::create_dir_all(&metadata_dir)?;
        let entries: Vec<String> = self
            .packages
            .iter()
            .map(|p| format!("{{ \"name\": \"{}\" }}", p.id))
            .collect();
        fs::write(
            metadata_dir.join("installed.json"),
            format!("{{ \"packages\": [ {} ] }}", entries.join(", ")),
        )?;
        for (name, content) in &self.metadata_files {
            fs::write(metadata_dir.join(name), content)?;
        }

        let mut ids: Vec<String> = self.packages.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }
}

/// Installer fake that always fails, for exercising the fatal
/// dependency-install path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingInstaller;

impl DependencyInstaller for FailingInstaller {
    async fn install(&self, _build_dir: &Path, _opts: &InstallOptions) -> Result<InstalledSet> {
        Err(WpackError::DependencyInstallFailed { reason: "simulated failure".to_string() }.into())
    }
}

/// Archive backend fake reporting no archival capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

impl ArchiveBackend for UnavailableBackend {
    fn is_available(&self) -> bool {
        false
    }

    fn archive(&self, _build_dir: &Path, _output_file: &Path, _root_name: &str) -> Result<()> {
        Err(WpackError::ArchiveUnavailable.into())
    }
}
