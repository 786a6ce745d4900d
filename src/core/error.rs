//! Error handling for wpack
//!
//! This module provides the error types and user-friendly error reporting for
//! the build pipeline. The error system is designed around two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Configuration**: [`WpackError::ConfigNotFound`], [`WpackError::ConfigInvalid`]
//!   are pre-flight failures, raised before any filesystem mutation.
//! - **Dependency materialization**: [`WpackError::ManifestInvalid`],
//!   [`WpackError::ComposerNotFound`], [`WpackError::DependencyInstallFailed`],
//!   [`WpackError::InstallTimeout`] are fatal; the build tree is left as-is
//!   for inspection.
//! - **Package metadata**: [`WpackError::PackageMetadataMissing`],
//!   [`WpackError::PackageMetadataInvalid`] are fatal for namespace resolution.
//! - **Archiving**: [`WpackError::ArchiveUnavailable`] (degrades to folder-only
//!   output with a warning) and [`WpackError::ArchiveIo`] (fatal, the archive
//!   was attempted but failed mid-way).
//!
//! Use [`user_friendly_error`] to convert any [`anyhow::Error`] into an
//! [`ErrorContext`] with a suggestion before displaying it to the user.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for wpack operations.
///
/// Each variant represents a specific failure mode of the build pipeline and
/// carries the details needed for a single, clear user-facing message. The
/// orchestrator never retries; corrective action is left to the operator.
#[derive(Error, Debug)]
pub enum WpackError {
    /// No `wpack.toml` was found at the project root.
    #[error("wpack.toml not found in {path}")]
    ConfigNotFound {
        /// The project root that was searched
        path: String,
    },

    /// The configuration file exists but is unusable: TOML syntax errors,
    /// an empty `plugin_id`, or a missing `namespace_prefix` while the
    /// prefixer is enabled.
    #[error("invalid wpack.toml: {reason}")]
    ConfigInvalid {
        /// What made the configuration unusable
        reason: String,
    },

    /// The project's `composer.json` could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    ManifestInvalid {
        /// Path of the offending manifest
        path: String,
        /// Parser diagnostic
        reason: String,
    },

    /// A package in the prefixing scope has no `composer.json` to read
    /// its namespace map from.
    #[error("package '{package}' has no composer.json")]
    PackageMetadataMissing {
        /// The vendor package identifier (`vendor/name`)
        package: String,
    },

    /// A package's `composer.json` exists but could not be parsed.
    #[error("invalid composer.json for package '{package}': {reason}")]
    PackageMetadataInvalid {
        /// The vendor package identifier (`vendor/name`)
        package: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The `composer` executable is not on `PATH` (and no override was
    /// provided via the `WPACK_COMPOSER` environment variable).
    #[error("composer executable not found")]
    ComposerNotFound,

    /// The dependency installer subprocess failed: non-zero exit status or
    /// no output captured at all.
    #[error("dependency installation failed: {reason}")]
    DependencyInstallFailed {
        /// Stderr from the installer, or a description of the failure
        reason: String,
    },

    /// The dependency installer did not finish within the allotted time.
    #[error("dependency installation timed out after {seconds} seconds")]
    InstallTimeout {
        /// The timeout that expired
        seconds: u64,
    },

    /// No archive backend is available in this environment. Non-fatal: the
    /// pipeline degrades to folder-only output and records a warning.
    #[error("no archive backend is available")]
    ArchiveUnavailable,

    /// Archive creation was attempted but failed part-way through.
    #[error("failed to write archive {path}: {reason}")]
    ArchiveIo {
        /// The archive file being written
        path: String,
        /// Underlying zip or I/O diagnostic
        reason: String,
    },

    /// Standard I/O error from the underlying filesystem operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wrapper that pairs an error with a user-facing suggestion.
///
/// The CLI converts every top-level failure into an `ErrorContext` via
/// [`user_friendly_error`] so the operator sees one clear message naming the
/// failing precondition, plus a hint about the corrective action.
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Short, actionable hint ("create a wpack.toml", "install composer", ...)
    pub suggestion: Option<String>,
    /// Longer background details, shown after the suggestion
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without suggestion or details.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self { error: error.into(), suggestion: None, details: None }
    }

    /// Attach a suggestion line.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a details line.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error (and any suggestion/details) to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {} {}", "hint:".yellow().bold(), suggestion);
        }
        if let Some(details) = &self.details {
            eprintln!("  {details}");
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  hint: {suggestion}")?;
        }
        if let Some(details) = &self.details {
            write!(f, "\n  {details}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a contextual suggestion.
///
/// Known [`WpackError`] variants get a tailored hint; everything else is
/// passed through unchanged.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<WpackError>() {
        Some(WpackError::ConfigNotFound { .. }) => Some(
            "run `wpack build` from the root of a wpack project, or create a wpack.toml"
                .to_string(),
        ),
        Some(WpackError::ConfigInvalid { .. }) => {
            Some("fix wpack.toml and re-run the build".to_string())
        }
        Some(WpackError::ComposerNotFound) => Some(
            "install Composer (https://getcomposer.org) or point WPACK_COMPOSER at the executable"
                .to_string(),
        ),
        Some(WpackError::DependencyInstallFailed { .. }) => Some(
            "run `composer install` manually in the build directory to see the full output"
                .to_string(),
        ),
        Some(WpackError::InstallTimeout { .. }) => {
            Some("check network connectivity to your Composer mirrors".to_string())
        }
        Some(WpackError::ManifestInvalid { .. })
        | Some(WpackError::PackageMetadataInvalid { .. }) => {
            Some("run `composer validate` to locate the syntax error".to_string())
        }
        _ => None,
    };

    ErrorContext { error, suggestion, details: None }
}
