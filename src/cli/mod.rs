//! Command-line interface for Zuro.
//!
//! This module defines the `zuro` binary's command structure using the
//! `clap` derive API. Parsing and execution are separated: [`Cli`] parses
//! arguments into typed commands, [`CliConfig`] captures the global flags,
//! and each command module carries its own execution logic.
//!
//! # Commands
//!
//! - [`init`]: Initialize a Zuro project, fresh or in an existing
//!   directory, and install the core template module.
//! - [`add`]: Add a registry module (auth, docs, database dialects, ...)
//!   to an initialized project.
//!
//! # Global Options
//!
//! Global flags apply to every subcommand:
//!
//! - `--verbose` / `-v`: Debug-level logging for troubleshooting
//! - `--quiet` / `-q`: Suppress all logging, mutually exclusive with
//!   `--verbose`
//! - `--no-progress`: Disable spinners and progress bars for scripted runs
//!
//! # Environment Variables
//!
//! - `ZURO_REGISTRY_URL`: Override the registry entry URL
//! - `ZURO_NO_PROGRESS`: Same effect as `--no-progress`
//! - `RUST_LOG`: Log filter, set from the verbosity flags
//!
//! # Error Handling
//!
//! Command errors propagate to `main`, which renders them through
//! [`crate::core::user_friendly_error`] and exits with status 1. Dismissing
//! an interactive prompt is not an error: the command prints
//! `Operation cancelled.` and exits with status 0.
//!
//! # Examples
//!
//! ```bash
//! zuro init                  # Set up a project interactively
//! zuro add auth              # Add the auth module
//! zuro -v add database       # Add a database with debug logging
//! zuro --no-progress init    # CI-friendly output
//! ```

mod add;
pub mod common;
mod init;


use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::constants::NO_PROGRESS_ENV;

/// Runtime configuration derived from the global CLI flags.
///
/// Built once per invocation by [`Cli::build_config`] and applied to the
/// process environment before any command runs. Keeping this separate from
/// [`Cli`] lets tests and programmatic callers inject their own
/// configuration without re-parsing arguments.
///
/// # Examples
///
/// ```rust,ignore
/// use zuro_cli::cli::CliConfig;
///
/// let mut config = CliConfig::new();
/// config.log_level = Some("debug".to_string());
/// config.no_progress = true;
/// config.apply_to_env();
/// ```
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level for the `RUST_LOG` environment variable.
    ///
    /// Common values are `"info"` for normal operation and `"debug"` for
    /// troubleshooting. When `None`, the existing `RUST_LOG` value is
    /// preserved and quiet runs stay quiet.
    pub log_level: Option<String>,

    /// Whether to disable progress indicators and animated output.
    ///
    /// When `true`, sets the `ZURO_NO_PROGRESS` environment variable, which
    /// every indicator in [`crate::utils::ProgressBar`] respects. Useful for
    /// CI pipelines and terminals without ANSI support.
    pub no_progress: bool,
}

impl CliConfig {
    /// Creates a configuration with no log override and progress enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply this configuration to the process environment.
    ///
    /// Sets `RUST_LOG` from `log_level` and `ZURO_NO_PROGRESS` when
    /// progress is disabled. It should be called exactly once, at the start
    /// of CLI execution before any threads spawn, since mutating the
    /// environment is not thread-safe.
    pub fn apply_to_env(&self) {
        if let Some(ref level) = self.log_level {
            unsafe {
                std::env::set_var("RUST_LOG", level);
            }
        }

        if self.no_progress {
            unsafe {
                std::env::set_var(NO_PROGRESS_ENV, "1");
            }
        }
    }
}

/// Main CLI structure for the `zuro` binary.
///
/// Represents the root command with its global options. Parsing is handled
/// by `clap`; execution happens in two phases so that configuration can be
/// injected for testing:
///
/// 1. [`build_config`](Self::build_config) turns the verbosity flags into a
///    [`CliConfig`].
/// 2. [`execute_with_config`](Self::execute_with_config) applies the
///    configuration and dispatches to the subcommand.
///
/// # Examples
///
/// ```rust,ignore
/// use clap::Parser;
/// use zuro_cli::cli::Cli;
///
/// # tokio_test::block_on(async {
/// let cli = Cli::parse_from(["zuro", "add", "auth"]);
/// cli.execute().await?;
/// # Ok::<(), anyhow::Error>(())
/// # });
/// ```
#[derive(Parser)]
#[command(
    name = "zuro",
    version,
    about = "Scaffold TypeScript Express APIs from the Zuro module registry",
    long_about = None
)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging for detailed diagnostics.
    ///
    /// Shows registry requests, retry attempts, file writes, and package
    /// manager invocations. Equivalent to setting `RUST_LOG=debug`.
    /// Mutually exclusive with `--quiet`.
    ///
    /// # Examples
    ///
    /// ```bash
    /// zuro --verbose add auth
    /// zuro -v init
    /// ```
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging output for automation.
    ///
    /// Prompts, step results, and errors are still printed; only the log
    /// stream is silenced.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Disable progress bars and spinners.
    ///
    /// Useful when output is captured to a file or the terminal does not
    /// render ANSI escape sequences.
    ///
    /// # Examples
    ///
    /// ```bash
    /// zuro --no-progress init > init.log 2>&1
    /// ```
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands for the Zuro CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a Zuro project in the current directory
    ///
    /// Creates `zuro.json`, installs the core template module from the
    /// registry, and writes a starter `.env`. Detects existing projects and
    /// adapts them instead of overwriting.
    Init(init::InitCommand),

    /// Add a module from the registry to this project
    ///
    /// Resolves the module and its dependencies, installs npm packages with
    /// the project's package manager, scaffolds template files, and wires
    /// generated entrypoints into the application.
    Add(add::AddCommand),
}

impl Cli {
    /// Execute the parsed command with configuration from the CLI flags.
    ///
    /// This is the standard entry point used by `main`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the dispatched command produced.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build a [`CliConfig`] from the global flags.
    ///
    /// Verbosity maps to a `RUST_LOG` level: `--verbose` gives `debug`,
    /// `--quiet` gives no logging at all, and the default is `info`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig { log_level, no_progress: self.no_progress }
    }

    /// Execute the parsed command with an explicit configuration.
    ///
    /// Applies `config` to the environment first, then dispatches. Tests
    /// use this to run commands under a controlled configuration.
    ///
    /// # Errors
    ///
    /// Returns whatever error the dispatched command produced.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.apply_to_env();

        match self.command {
            Commands::Init(cmd) => cmd.execute().await,
            Commands::Add(cmd) => cmd.execute().await,
        }
    }
}
