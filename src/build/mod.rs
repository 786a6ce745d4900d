//! The build pipeline orchestrator.
//!
//! Sequences the whole packaging run as a small state machine:
//!
//! ```text
//! Validating -> Preparing -> Resolving -> Copying -> Archiving -> Done
//!      \___________\___________\___________\___________\____> Failed
//! ```
//!
//! Any step's fatal error short-circuits the remaining steps; partial build
//! output is intentionally left on disk for diagnosis rather than rolled
//! back. Re-running is always safe because `Preparing` unconditionally
//! deletes and recreates the output directory.
//!
//! The pipeline is generic over its two external collaborators (the
//! dependency installer subprocess and the archive backend) so the control
//! flow is fully exercisable in tests with fakes.

pub mod copy;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveBackend;
use crate::composer::installer::{DependencyInstaller, InstallOptions};
use crate::composer::manifest;
use crate::config::WpackConfig;
use crate::constants::{
    ASSETS_DIR, COMPOSER_METADATA_DIR, PHP_EXTENSION, README_FILE, SOURCE_DIR, VENDOR_DIR,
};
use crate::prefixer::{self, NamespaceRewriter, NamespaceTable, RewriteMode};
use crate::utils::fs::{ensure_dir, remove_dir_all};
use copy::{copy_file, copy_tree};

/// Pipeline states, in execution order. `Failed` is reachable from any of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Validating,
    Preparing,
    Resolving,
    Copying,
    Archiving,
    Done,
    Failed,
}

/// Structured summary of a completed build.
#[derive(Debug)]
pub struct BuildOutcome {
    /// The plugin identifier the build ran for.
    pub plugin_id: String,
    /// The staged output tree (`output_dir/plugin_id/`).
    pub build_dir: PathBuf,
    /// The archive, when an archive backend was available.
    pub archive: Option<PathBuf>,
    /// Non-fatal findings: unknown scope packages, missing entry file,
    /// unavailable archive backend.
    pub warnings: Vec<String>,
}

/// The namespace-prefixing build pipeline.
pub struct BuildPipeline<I, A> {
    project_root: PathBuf,
    installer: I,
    archiver: A,
    force_ignore_platform_reqs: bool,
    quiet: bool,
    state: BuildState,
}

impl<I, A> BuildPipeline<I, A>
where
    I: DependencyInstaller,
    A: ArchiveBackend,
{
    /// Creates a pipeline for the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>, installer: I, archiver: A) -> Self {
        Self {
            project_root: project_root.into(),
            installer,
            archiver,
            force_ignore_platform_reqs: false,
            quiet: false,
            state: BuildState::Validating,
        }
    }

    /// Forces `--ignore-platform-reqs` on the installer regardless of the
    /// configuration file.
    #[must_use]
    pub fn ignore_platform_reqs(mut self, force: bool) -> Self {
        self.force_ignore_platform_reqs = force;
        self
    }

    /// Suppresses progress lines on stdout.
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The state the pipeline last reached.
    pub fn state(&self) -> BuildState {
        self.state
    }

    fn transition(&mut self, state: BuildState) {
        tracing::debug!(target: "build", "entering state {state:?}");
        self.state = state;
    }

    fn progress(&self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    /// Runs the pipeline to completion.
    pub async fn run(&mut self) -> Result<BuildOutcome> {
        match self.run_inner().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }

    async fn run_inner(&mut self) -> Result<BuildOutcome> {
        // Validating: nothing on disk may change before this passes.
        self.transition(BuildState::Validating);
        let config = WpackConfig::load(&self.project_root)?;
        let plugin_id = config.plugin_id.clone();
        let output_dir = self.project_root.join(&config.build.output_dir);
        let build_dir = output_dir.join(&plugin_id);

        self.progress(&format!("Building distribution package for: {plugin_id}"));
        if let Some(prefix) = config.namespace_prefix() {
            self.progress(&format!("Using namespace prefix: {prefix}"));
        }

        // Preparing: a fresh tree every run; stale artifacts never leak.
        self.transition(BuildState::Preparing);
        remove_dir_all(&output_dir)?;
        ensure_dir(&build_dir)?;
        self.progress(&format!("Created directory: {}/{plugin_id}/", config.build.output_dir));

        // Resolving: materialize dependencies, then the mapping table.
        self.transition(BuildState::Resolving);
        let mut warnings = Vec::new();

        let installed = if manifest::prepare_manifest(&self.project_root, &build_dir)? {
            let opts = InstallOptions {
                ignore_platform_reqs: self.force_ignore_platform_reqs
                    || config.build.ignore_platform_reqs,
                ..InstallOptions::default()
            };
            let installed = self.installer.install(&build_dir, &opts).await?;
            if config.build.composer_cleanup {
                manifest::cleanup_manifest(&build_dir)?;
            }
            self.progress(&format!("Installed {} dependency package(s)", installed.len()));
            installed
        } else {
            Vec::new()
        };

        let (scope, scope_warnings) = prefixer::resolve_scope(&installed, &config.scope());
        for warning in &scope_warnings {
            tracing::warn!(target: "prefixer", "{warning}");
        }
        warnings.extend(scope_warnings);

        let vendor_dir = build_dir.join(VENDOR_DIR);
        let rewriter = match config.namespace_prefix() {
            Some(prefix) => {
                let table = NamespaceTable::build(&scope, &vendor_dir, prefix)?;
                if table.is_empty() {
                    None
                } else {
                    Some(NamespaceRewriter::new(&table)?)
                }
            }
            None => None,
        };

        // Copying: first-party sources, scoped vendor packages (in place),
        // autoloader metadata, assets, entry file, documentation.
        self.transition(BuildState::Copying);

        let source_dir = self.project_root.join(SOURCE_DIR);
        if source_dir.is_dir() {
            copy_tree(
                &source_dir,
                &build_dir.join(SOURCE_DIR),
                rewriter.as_ref(),
                RewriteMode::Reference,
            )?;
            self.progress("Copied and processed: src/");
        }

        if rewriter.is_some() {
            for package_id in &scope {
                let package_dir = vendor_dir.join(package_id);
                if !package_dir.is_dir() {
                    continue;
                }
                copy_tree(&package_dir, &package_dir, rewriter.as_ref(), RewriteMode::Declaration)?;
                self.progress(&format!("Processed vendor package: {package_id}"));
            }

            let metadata_dir = vendor_dir.join(COMPOSER_METADATA_DIR);
            if metadata_dir.is_dir() {
                copy_tree(&metadata_dir, &metadata_dir, rewriter.as_ref(), RewriteMode::Metadata)?;
                self.progress("Processed autoloader metadata");
            }
        }

        let assets_dir = self.project_root.join(ASSETS_DIR);
        if assets_dir.is_dir() {
            copy_tree(
                &assets_dir,
                &build_dir.join(ASSETS_DIR),
                rewriter.as_ref(),
                RewriteMode::Reference,
            )?;
            self.progress("Copied: assets/");
        }

        let entry_file = format!("{plugin_id}.{PHP_EXTENSION}");
        let entry_path = self.project_root.join(&entry_file);
        if entry_path.is_file() {
            copy_file(
                &entry_path,
                &build_dir.join(&entry_file),
                rewriter.as_ref(),
                RewriteMode::Reference,
            )?;
            self.progress(&format!("Copied and processed: {entry_file}"));
        } else {
            let warning = format!("entry file not found: {entry_file}");
            tracing::warn!(target: "build", "{warning}");
            warnings.push(warning);
        }

        let readme_path = self.project_root.join(README_FILE);
        if readme_path.is_file() {
            fs::copy(&readme_path, build_dir.join(README_FILE))?;
            self.progress(&format!("Copied: {README_FILE}"));
        }

        // Archiving: a capability, not a requirement.
        self.transition(BuildState::Archiving);
        let archive = if self.archiver.is_available() {
            let archive_path = output_dir.join(format!("{plugin_id}.zip"));
            self.archiver.archive(&build_dir, &archive_path, &plugin_id)?;
            self.progress(&format!("Created: {plugin_id}.zip"));
            Some(archive_path)
        } else {
            let warning = "no archive backend available, producing folder output only".to_string();
            tracing::warn!(target: "archive", "{warning}");
            warnings.push(warning);
            None
        };

        self.transition(BuildState::Done);
        Ok(BuildOutcome { plugin_id, build_dir, archive, warnings })
    }
}

/// Convenience for paths shown to the user relative to the project root.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}
