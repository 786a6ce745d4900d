//! Command-line interface for wpack.
//!
//! The CLI is deliberately thin: one `build` subcommand plus global
//! verbosity flags. All packaging behavior lives in [`crate::build`]; this
//! module only parses arguments, configures logging, and dispatches.
//!
//! # Usage
//!
//! ```bash
//! # Build the plugin in the current directory
//! wpack build
//!
//! # Detailed diagnostics
//! wpack --verbose build
//!
//! # Automation-friendly: errors only
//! wpack --quiet build
//! ```

pub mod build;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Main CLI application structure for wpack.
///
/// Handles global flags and delegates to subcommands.
#[derive(Parser)]
#[command(
    name = "wpack",
    about = "WordPress plugin packager - bundle Composer dependencies under a unique namespace prefix",
    version,
    author,
    long_about = "wpack packages a Composer-based WordPress plugin into a distributable \
                  folder and zip, rewriting every bundled vendor namespace with a \
                  plugin-unique prefix so two plugins bundling the same library never \
                  collide inside one WordPress process."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging and detailed information.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors, for scripts and CI pipelines.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build the distributable plugin package (folder + zip).
    Build(build::BuildCommand),
}

impl Cli {
    /// Configures logging and executes the selected command.
    pub async fn execute(self) -> Result<()> {
        init_logging(self.verbose, self.quiet);
        match self.command {
            Commands::Build(cmd) => cmd.execute(self.quiet).await,
        }
    }
}

/// Initializes the tracing subscriber once.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` maps to `debug` and the
/// default stays at `warn` so progress reporting is left to plain stdout
/// lines rather than log noise.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
