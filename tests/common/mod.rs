//! Common test utilities for wpack integration tests.
//!
//! Consolidates the on-disk project scaffolding and binary invocation
//! helpers used across the integration suite.

// Allow dead code because these utilities are shared across test files and
// not every helper is used in every file
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A plugin project laid out on disk, driven through the real binary.
pub struct CliProject {
    temp: TempDir,
}

impl CliProject {
    /// Creates an empty project directory.
    pub fn new() -> Result<Self> {
        Ok(Self { temp: TempDir::new().context("Failed to create temp project")? })
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        self.temp.path()
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

    /// Absolute path of a file relative to the project root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp.path().join(relative)
    }

    /// Scaffolds the standard no-dependency fixture: config, `src/` tree,
    /// entry file, and README.
    pub fn scaffold_basic(&self, plugin_id: &str) -> Result<()> {
        self.write_file("wpack.toml", &format!("plugin_id = \"{plugin_id}\"\n"))?;
        self.write_file(
            "src/Plugin.php",
            "<?php\n\nnamespace AcmeApp;\n\nclass Plugin\n{\n}\n",
        )?;
        self.write_file("src/Admin/Page.php", "<?php\n\nnamespace AcmeApp\\Admin;\n")?;
        self.write_file(
            &format!("{plugin_id}.php"),
            "<?php\n/* Plugin Name: Acme App */\n",
        )?;
        self.write_file("README.md", "# Acme App\n")?;
        Ok(())
    }

    /// Runs `wpack` with the given arguments in the project root.
    pub fn run_wpack(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        let mut cmd = assert_cmd::Command::cargo_bin("wpack").unwrap();
        cmd.current_dir(self.temp.path());
        cmd.args(args);
        cmd.assert()
    }

    /// Runs `wpack` with an environment variable set.
    pub fn run_wpack_with_env(
        &self,
        args: &[&str],
        key: &str,
        value: &str,
    ) -> assert_cmd::assert::Assert {
        let mut cmd = assert_cmd::Command::cargo_bin("wpack").unwrap();
        cmd.current_dir(self.temp.path());
        cmd.env(key, value);
        cmd.args(args);
        cmd.assert()
    }
}

/// Collects the sorted relative paths of every file under `root`.
pub fn file_inventory(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) {
        let Ok(entries) = fs::read_dir(dir) else { return };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(root, &path, files);
            } else {
                files.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }

    let mut files = Vec::new();
    walk(root, root, &mut files);
    files.sort();
    files
}
