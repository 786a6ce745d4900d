//! Global constants used throughout the wpack codebase.
//!
//! File names, directory layout conventions, and timeout values that are
//! shared across multiple modules. Defining them centrally keeps the
//! Composer/WordPress layout assumptions discoverable in one place.

use std::time::Duration;

/// Project configuration file, looked up at the project root.
pub const CONFIG_FILE: &str = "wpack.toml";

/// Composer package manifest, at the project root and inside every
/// vendor package directory.
pub const COMPOSER_MANIFEST: &str = "composer.json";

/// Composer lockfile written next to the manifest by `composer install`.
pub const COMPOSER_LOCKFILE: &str = "composer.lock";

/// Directory Composer installs packages into.
pub const VENDOR_DIR: &str = "vendor";

/// Subdirectory of `vendor/` holding Composer's generated autoloader tables.
pub const COMPOSER_METADATA_DIR: &str = "composer";

/// Composer's machine-readable inventory of installed packages,
/// under `vendor/composer/`.
pub const INSTALLED_METADATA: &str = "installed.json";

/// First-party source directory copied into the build tree.
pub const SOURCE_DIR: &str = "src";

/// Ancillary asset directory copied into the build tree when present.
pub const ASSETS_DIR: &str = "assets";

/// Documentation file copied verbatim into the build tree when present.
pub const README_FILE: &str = "README.md";

/// File extension of rewritable source files. Everything else is copied
/// byte-for-byte.
pub const PHP_EXTENSION: &str = "php";

/// The PHP namespace separator.
pub const NAMESPACE_SEPARATOR: char = '\\';

/// Default output directory for build artifacts, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Environment variable that overrides the `composer` executable used for
/// dependency installation. Primarily useful for tests and CI sandboxes.
pub const COMPOSER_BIN_ENV: &str = "WPACK_COMPOSER";

/// Timeout for the `composer install` subprocess (10 minutes).
///
/// Dependency installation may download packages over the network; this
/// bound prevents a hung mirror from blocking the build forever. Expiry is
/// a fatal error, never a retry.
pub const COMPOSER_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);
