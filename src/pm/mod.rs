//! Package manager detection and dependency installation
//!
//! Zuro never bundles packages itself; it shells out to the project's own
//! package manager. This module owns the full contract: detecting which
//! manager a project uses from its lock file, verifying the binary exists
//! before anything is mutated, and running installs as child processes with
//! a timeout and captured output.
//!
//! # Command Contract
//!
//! | Manager | Runtime install | Dev install |
//! |---------|-----------------|-------------|
//! | npm | `npm install <pkgs>` | `npm install --save-dev <pkgs>` |
//! | pnpm | `pnpm add <pkgs>` | `pnpm add -D <pkgs>` |
//! | yarn | `yarn add <pkgs>` | `yarn add -D <pkgs>` |
//! | bun | `bun add <pkgs>` | `bun add -d <pkgs>` |
//!
//! Package lists are de-duplicated preserving first occurrence, and an empty
//! list is a no-op: the package manager is never invoked with zero packages.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::constants::PM_INSTALL_TIMEOUT;
use crate::core::ZuroError;
use crate::utils::platform::command_exists;

/// The package managers Zuro knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm, the Node.js default.
    Npm,
    /// pnpm, detected via `pnpm-lock.yaml`.
    Pnpm,
    /// Yarn, detected via `yarn.lock`.
    Yarn,
    /// Bun, detected via `bun.lockb` or `bun.lock`.
    Bun,
}

impl PackageManager {
    /// All supported managers.
    pub const ALL: [Self; 4] = [Self::Npm, Self::Pnpm, Self::Yarn, Self::Bun];

    /// The executable name invoked on the command line.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Pnpm => "pnpm",
            Self::Yarn => "yarn",
            Self::Bun => "bun",
        }
    }

    /// Parses a manager name as stored in `zuro.json`.
    ///
    /// Returns `None` for unknown names so a hand-edited config degrades to
    /// lock-file detection instead of crashing.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "npm" => Some(Self::Npm),
            "pnpm" => Some(Self::Pnpm),
            "yarn" => Some(Self::Yarn),
            "bun" => Some(Self::Bun),
            _ => None,
        }
    }

    /// Detects the active package manager from lock-file presence.
    ///
    /// Priority: `pnpm-lock.yaml`, then `bun.lockb`/`bun.lock`, then
    /// `yarn.lock`. Falls back to npm when no lock file is found.
    #[must_use]
    pub fn detect(project_root: &Path) -> Self {
        if project_root.join("pnpm-lock.yaml").exists() {
            return Self::Pnpm;
        }
        if project_root.join("bun.lockb").exists() || project_root.join("bun.lock").exists() {
            return Self::Bun;
        }
        if project_root.join("yarn.lock").exists() {
            return Self::Yarn;
        }
        Self::Npm
    }

    /// Verifies the manager's binary is callable, before any install runs.
    ///
    /// # Errors
    ///
    /// Returns [`ZuroError::PackageManagerNotFound`] when the binary is not
    /// on PATH, so the user gets installation guidance instead of a spawn
    /// failure mid-operation.
    pub fn ensure_available(&self) -> Result<(), ZuroError> {
        if command_exists(self.command()) {
            Ok(())
        } else {
            Err(ZuroError::PackageManagerNotFound {
                name: self.command().to_string(),
            })
        }
    }

    /// Resolves the full path of the manager's binary.
    ///
    /// Going through PATH resolution here also finds `npm.cmd` style shims
    /// on Windows, which a bare `Command::new("npm")` would miss.
    fn resolve_binary(&self) -> Result<PathBuf, ZuroError> {
        which::which(self.command()).map_err(|_| ZuroError::PackageManagerNotFound {
            name: self.command().to_string(),
        })
    }

    /// The subcommand and flag used to install packages.
    fn install_args(&self, dev: bool) -> Vec<String> {
        let mut args = match self {
            Self::Npm => vec!["install".to_string()],
            Self::Pnpm | Self::Yarn | Self::Bun => vec!["add".to_string()],
        };
        if dev {
            let flag = match self {
                Self::Npm => "--save-dev",
                Self::Pnpm | Self::Yarn => "-D",
                Self::Bun => "-d",
            };
            args.push(flag.to_string());
        }
        args
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

impl std::str::FromStr for PackageManager {
    type Err = ZuroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ZuroError::Other {
            message: format!("Unknown package manager '{s}' (expected npm, pnpm, yarn, or bun)"),
        })
    }
}

/// Installs packages into a project.
///
/// De-duplicates the list preserving first occurrence and returns early
/// without spawning anything when nothing is left to install.
///
/// # Errors
///
/// Returns [`ZuroError::PackageManagerNotFound`] if the binary is missing and
/// [`ZuroError::PackageManagerError`] when the install process fails or times
/// out.
pub async fn install_packages(
    manager: PackageManager,
    packages: &[String],
    project_root: &Path,
    dev: bool,
) -> Result<()> {
    let packages = dedup_preserving_order(packages);
    if packages.is_empty() {
        debug!(manager = %manager, dev, "No packages to install, skipping");
        return Ok(());
    }

    manager.ensure_available()?;

    let mut args = manager.install_args(dev);
    args.extend(packages);

    PmCommand::new(manager).args(args).current_dir(project_root).execute().await?;
    Ok(())
}

fn dedup_preserving_order(packages: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for package in packages {
        if seen.insert(package.as_str()) {
            result.push(package.clone());
        }
    }
    result
}

/// Builder for package manager invocations with consistent error handling.
///
/// Handles binary resolution, working directory, timeout management, and
/// output capture in one place so every install behaves identically.
///
/// # Examples
///
/// ```rust,ignore
/// let output = PmCommand::new(PackageManager::Pnpm)
///     .args(["add", "zod"])
///     .current_dir(project_root)
///     .execute()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct PmCommand {
    manager: PackageManager,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout_duration: Duration,
}

impl PmCommand {
    /// Creates a command for the given manager with the default timeout.
    #[must_use]
    pub fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            args: Vec::new(),
            current_dir: None,
            timeout_duration: PM_INSTALL_TIMEOUT,
        }
    }

    /// Appends arguments to the invocation.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the child process.
    #[must_use]
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Overrides the execution timeout.
    #[must_use]
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Executes the command, capturing output.
    ///
    /// # Errors
    ///
    /// Returns [`ZuroError::PackageManagerError`] for non-zero exits and
    /// timeouts, with the process stderr (or a timeout explanation) attached.
    pub async fn execute(self) -> Result<PmCommandOutput> {
        let start = std::time::Instant::now();
        let binary = self.manager.resolve_binary()?;

        debug!(
            target: "pm",
            "Executing command: {} {}",
            self.manager.command(),
            self.args.join(" ")
        );

        let mut cmd = Command::new(&binary);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let operation = self.operation_name();
        let output_future = cmd.output();

        let output = if let Ok(result) = timeout(self.timeout_duration, output_future).await {
            result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ZuroError::PackageManagerNotFound {
                        name: self.manager.command().to_string(),
                    }
                } else {
                    ZuroError::PackageManagerError {
                        operation: operation.clone(),
                        stderr: e.to_string(),
                    }
                }
            })?
        } else {
            tracing::warn!(
                target: "pm",
                "Command timed out after {} seconds: {} {}",
                self.timeout_duration.as_secs(),
                self.manager.command(),
                self.args.join(" ")
            );
            return Err(ZuroError::PackageManagerError {
                operation,
                stderr: format!(
                    "Command timed out after {} seconds. This may indicate:\n\
                    - Network connectivity issues\n\
                    - A registry mirror that is not responding\n\
                    Try running the command manually: {} {}",
                    self.timeout_duration.as_secs(),
                    self.manager.command(),
                    self.args.join(" ")
                ),
            }
            .into());
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);

            debug!(
                target: "pm",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                debug!(target: "pm", "Error: {}", stderr);
            }

            return Err(ZuroError::PackageManagerError {
                operation,
                stderr: if stderr.is_empty() {
                    stdout.to_string()
                } else {
                    stderr.to_string()
                },
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stdout.is_empty() {
            debug!(target: "pm", "{}", stdout.trim());
        }

        let elapsed = start.elapsed();
        if elapsed.as_secs() > 1 {
            tracing::info!(
                target: "pm::perf",
                "{} {} took {:.2}s",
                self.manager.command(),
                operation,
                elapsed.as_secs_f64()
            );
        } else if elapsed.as_millis() > 100 {
            debug!(
                target: "pm::perf",
                "{} {} took {}ms",
                self.manager.command(),
                operation,
                elapsed.as_millis()
            );
        }

        Ok(PmCommandOutput {
            stdout,
            stderr,
        })
    }

    fn operation_name(&self) -> String {
        format!(
            "{} {}",
            self.manager.command(),
            self.args.first().map_or("", String::as_str)
        )
    }
}

/// Output from a package manager command.
pub struct PmCommandOutput {
    /// Standard output from the process.
    pub stdout: String,
    /// Standard error output from the process.
    pub stderr: String,
}
