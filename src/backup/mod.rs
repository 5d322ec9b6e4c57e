//! Snapshots of database files before a dialect switch
//!
//! Switching an installed project from one database dialect to another
//! overwrites the Drizzle setup in place. Before that happens, the files the
//! switch is about to replace are copied into a timestamped directory under
//! `.zuro/backups/`, mirroring their paths relative to the project root so a
//! user can restore them by copying back.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::DOTFOLDER;
use crate::utils::ensure_dir;

const BACKUPS_SUBDIR: &str = "backups";

/// The project-relative files a dialect switch replaces.
#[must_use]
pub fn database_file_set(src_dir: &str) -> [PathBuf; 3] {
    [
        Path::new(src_dir).join("db").join("index.ts"),
        Path::new(src_dir).join("db").join("schema.ts"),
        PathBuf::from("drizzle.config.ts"),
    ]
}

/// Copies the existing database files into a fresh timestamped backup
/// directory.
///
/// Returns the backup directory path, or `None` when none of the files
/// exist (nothing to back up, no directory is created).
///
/// # Errors
///
/// Returns an error if a backup directory or file copy fails.
pub fn backup_database_files(project_root: &Path, src_dir: &str) -> Result<Option<PathBuf>> {
    let present: Vec<PathBuf> = database_file_set(src_dir)
        .into_iter()
        .filter(|relative| project_root.join(relative).exists())
        .collect();
    if present.is_empty() {
        debug!("No database files to back up");
        return Ok(None);
    }

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    let backup_dir = project_root
        .join(DOTFOLDER)
        .join(BACKUPS_SUBDIR)
        .join(format!("database-{timestamp}"));

    for relative in &present {
        let source = project_root.join(relative);
        let destination = backup_dir.join(relative);
        if let Some(parent) = destination.parent() {
            ensure_dir(parent)?;
        }
        std::fs::copy(&source, &destination).with_context(|| {
            format!("Failed to back up {} to {}", source.display(), destination.display())
        })?;
        debug!(file = %relative.display(), "Backed up");
    }

    Ok(Some(backup_dir))
}
