//! Dependency installation via the `composer` subprocess.
//!
//! The pipeline never talks to `composer` directly: it goes through the
//! narrow [`DependencyInstaller`] capability so the orchestration logic can
//! be exercised with a fake implementation in tests. The real implementation,
//! [`ComposerInstaller`], shells out through [`ComposerCommand`], a small
//! fluent builder that owns working-directory handling, output capture, and
//! the install timeout.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::composer::InstalledSet;
use crate::composer::manifest;
use crate::constants::{COMPOSER_BIN_ENV, COMPOSER_INSTALL_TIMEOUT};
use crate::core::WpackError;

/// Options forwarded to the installer invocation.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Pass `--ignore-platform-reqs`, skipping PHP version and extension
    /// checks on the machine running the build.
    pub ignore_platform_reqs: bool,
    /// Maximum time the subprocess may run; expiry is fatal.
    pub timeout: Duration,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self { ignore_platform_reqs: false, timeout: COMPOSER_INSTALL_TIMEOUT }
    }
}

/// Capability interface for production-only dependency installation.
///
/// Implementations materialize the dependency set declared by the manifest
/// in `build_dir` into `build_dir/vendor` and report what got installed.
pub trait DependencyInstaller {
    /// Install production dependencies into `build_dir` and return the
    /// installed package identifiers.
    fn install(
        &self,
        build_dir: &Path,
        opts: &InstallOptions,
    ) -> impl Future<Output = Result<InstalledSet>> + Send;
}

/// Locates the `composer` executable.
///
/// The `WPACK_COMPOSER` environment variable takes precedence; otherwise the
/// executable is resolved from `PATH`.
fn composer_executable() -> Result<PathBuf, WpackError> {
    if let Ok(override_path) = std::env::var(COMPOSER_BIN_ENV) {
        return Ok(PathBuf::from(override_path));
    }
    which::which("composer").map_err(|_| WpackError::ComposerNotFound)
}

/// Captured output of a finished composer invocation.
#[derive(Debug)]
pub struct ComposerOutput {
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error (composer writes progress here)
    pub stderr: String,
}

impl ComposerOutput {
    /// Stdout and stderr joined, for the "no output captured" check.
    fn combined_len(&self) -> usize {
        self.stdout.len() + self.stderr.len()
    }
}

/// Builder for constructing and executing composer commands with consistent
/// error handling.
pub struct ComposerCommand {
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Duration,
}

impl ComposerCommand {
    /// Creates a builder with no arguments and the default install timeout.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            timeout_duration: COMPOSER_INSTALL_TIMEOUT,
        }
    }

    /// Sets the working directory the command runs in.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Adds a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Runs the command to completion, capturing output.
    ///
    /// # Errors
    ///
    /// [`WpackError::ComposerNotFound`] when no executable can be located,
    /// [`WpackError::InstallTimeout`] when the timeout expires, and
    /// [`WpackError::DependencyInstallFailed`] on a non-zero exit status or
    /// when the subprocess produced no output at all.
    pub async fn execute(self) -> Result<ComposerOutput> {
        let executable = composer_executable()?;
        let mut cmd = Command::new(&executable);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            target: "composer",
            "executing: {} {}",
            executable.display(),
            self.args.join(" ")
        );

        let output = match timeout(self.timeout_duration, cmd.output()).await {
            Ok(result) => result.with_context(|| {
                format!("Failed to execute {} {}", executable.display(), self.args.join(" "))
            })?,
            Err(_) => {
                tracing::warn!(
                    target: "composer",
                    "command timed out after {} seconds: composer {}",
                    self.timeout_duration.as_secs(),
                    self.args.join(" ")
                );
                return Err(WpackError::InstallTimeout {
                    seconds: self.timeout_duration.as_secs(),
                }
                .into());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "composer",
                "command failed with exit code {:?}",
                output.status.code()
            );
            let reason = if stderr.trim().is_empty() { stdout.clone() } else { stderr.clone() };
            return Err(WpackError::DependencyInstallFailed { reason }.into());
        }

        if !stderr.is_empty() {
            tracing::debug!(target: "composer", "{}", stderr.trim());
        }

        Ok(ComposerOutput { stdout, stderr })
    }
}

impl Default for ComposerCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// The real installer: `composer install` in production mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposerInstaller;

impl DependencyInstaller for ComposerInstaller {
    async fn install(&self, build_dir: &Path, opts: &InstallOptions) -> Result<InstalledSet> {
        let mut cmd = ComposerCommand::new()
            .args(["install", "--no-dev", "--optimize-autoloader", "--no-interaction"])
            .current_dir(build_dir)
            .with_timeout(opts.timeout);
        if opts.ignore_platform_reqs {
            cmd = cmd.arg("--ignore-platform-reqs");
        }

        let output = cmd.execute().await?;
        if output.combined_len() == 0 {
            // A silent installer is a broken installer.
            return Err(WpackError::DependencyInstallFailed {
                reason: "no output captured from composer".to_string(),
            }
            .into());
        }

        let installed = manifest::inventory_installed(build_dir)?;
        tracing::info!(target: "composer", "installed {} package(s)", installed.len());
        Ok(installed)
    }
}
