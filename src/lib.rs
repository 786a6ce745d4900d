//! wpack - WordPress Plugin Packager
//!
//! A build pipeline that packages a Composer-based WordPress plugin
//! (first-party `src/` plus selected `vendor/` packages) into a single
//! distributable folder and zip. Because WordPress loads every active plugin
//! into one shared PHP process with one global symbol namespace, each
//! bundled vendor namespace is rewritten with a plugin-unique prefix before
//! packaging; two plugins shipping the same library therefore never collide
//! at runtime.
//!
//! # Pipeline Overview
//!
//! A build runs as a sequential state machine:
//!
//! 1. **Validating** - load and check `wpack.toml` (no filesystem mutation
//!    happens before this passes)
//! 2. **Preparing** - delete and recreate the output directory
//! 3. **Resolving** - run `composer install` in the build tree, then derive
//!    the namespace mapping table from the installed packages' PSR-4
//!    metadata
//! 4. **Copying** - stage first-party sources, rewrite scoped vendor
//!    packages in place, rewrite Composer's autoloader tables, copy assets
//!    and documentation
//! 5. **Archiving** - zip the build tree, rooted under the plugin id
//!
//! # Core Modules
//!
//! - [`config`] - `wpack.toml` parsing and validation
//! - [`composer`] - package metadata, manifest preparation, and the
//!   dependency installer subprocess
//! - [`prefixer`] - namespace mapping resolution and text-level rewriting
//! - [`build`] - the tree copier and the pipeline orchestrator
//! - [`archive`] - zip production behind a capability interface
//! - [`cli`] - the thin command-line surface
//! - [`core`] - error taxonomy and user-facing error reporting
//!
//! # Configuration (wpack.toml)
//!
//! ```toml
//! plugin_id = "acme-app"
//!
//! [build]
//! output_dir = "dist"
//! composer_cleanup = true
//!
//! [build.prefixer]
//! enabled = true
//! namespace_prefix = "AcmeApp\\Deps"
//! include_packages = ["acme/http", "acme/router"]
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Build dist/acme-app/ and dist/acme-app.zip
//! wpack build
//!
//! # Skip Composer's platform requirement checks
//! wpack build --ignore-platform-reqs
//! ```

pub mod archive;
pub mod build;
pub mod cli;
pub mod composer;
pub mod config;
pub mod constants;
pub mod core;
pub mod prefixer;
pub mod utils;

// test_utils is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
