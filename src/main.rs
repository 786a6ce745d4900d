//! wpack CLI entry point
//!
//! This is the main executable for the WordPress plugin packager. It handles
//! command-line argument parsing, error display, and command execution.
//!
//! The CLI exposes a single `build` command which stages, prefixes, and
//! archives a distributable plugin package.

use anyhow::Result;
use clap::Parser;
use wpack_cli::cli;
use wpack_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to a user-friendly error with a suggestion
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
