//! Zuro CLI entry point
//!
//! This is the main executable for Zuro, a scaffolding tool for TypeScript
//! Express APIs. It handles command-line argument parsing, error display,
//! and command execution.
//!
//! Available commands:
//! - `init` - Initialize a Zuro project and install the core module
//! - `add` - Add a registry module to the project

use anyhow::Result;
use clap::Parser;
use zuro_cli::cli;
use zuro_cli::core::error::user_friendly_error;

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
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
