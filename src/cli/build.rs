//! Build a distribution package of the current plugin project.
//!
//! This module provides the `build` command: it loads `wpack.toml`, stages a
//! fresh build tree under the output directory, materializes production
//! dependencies with Composer, rewrites bundled namespaces under the
//! configured prefix, and zips the result.
//!
//! # Examples
//!
//! Build the project in the current directory:
//! ```bash
//! wpack build
//! ```
//!
//! Build while skipping Composer's platform checks (useful in containers
//! that run a different PHP version than production):
//! ```bash
//! wpack build --ignore-platform-reqs
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::env;
use std::path::PathBuf;

use crate::archive::ZipBackend;
use crate::build::{BuildPipeline, display_relative};
use crate::composer::installer::ComposerInstaller;

/// Command to build the distributable plugin package.
#[derive(Args)]
pub struct BuildCommand {
    /// Skip the dependency installer's platform requirement checks
    /// (PHP version and extensions) on the machine running the build.
    #[arg(long)]
    ignore_platform_reqs: bool,

    /// Project root to build (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    project_dir: Option<PathBuf>,
}

impl BuildCommand {
    /// Executes the build and prints the result summary.
    pub async fn execute(self, quiet: bool) -> Result<()> {
        let project_root = match self.project_dir {
            Some(dir) => dir,
            None => env::current_dir()?,
        };

        let mut pipeline =
            BuildPipeline::new(&project_root, ComposerInstaller, ZipBackend)
                .ignore_platform_reqs(self.ignore_platform_reqs)
                .quiet(quiet);

        let outcome = pipeline.run().await?;

        if !quiet {
            for warning in &outcome.warnings {
                println!("{} {warning}", "warning:".yellow().bold());
            }
            println!("{}", "Build completed successfully!".green().bold());
            println!(
                "  Folder: {}/",
                display_relative(&outcome.build_dir, &project_root)
            );
            match &outcome.archive {
                Some(archive) => {
                    println!("  Zip: {}", display_relative(archive, &project_root));
                }
                None => println!("  Zip: skipped (no archive backend)"),
            }
        }
        Ok(())
    }
}
