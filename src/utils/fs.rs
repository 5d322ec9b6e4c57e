//! File system utilities with atomic writes and path containment checks
//!
//! All mutations of project files go through this module so that a failed
//! write never leaves a half-written file behind. Writes land in a temporary
//! sibling file first and are renamed into place once fully flushed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Ensures a directory exists, creating it and any missing parents.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, for example due to
/// insufficient permissions or a file occupying the path.
///
/// # Examples
///
/// ```rust,no_run
/// use zuro_cli::utils::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new(".zuro/backups"))?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if path.is_dir() {
            return Ok(());
        }
        anyhow::bail!("Path exists but is not a directory: {}", path.display());
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// Writes content to a file atomically.
///
/// The content is written to a temporary file in the same directory, flushed
/// to disk, then renamed over the target. Readers observe either the old
/// content or the new content, never a partial write.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, the temporary
/// file cannot be written, or the rename fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let file_name =
        path.file_name().map_or_else(|| "file".to_string(), |n| n.to_string_lossy().to_string());
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let mut tmp_file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temporary file: {}", tmp_path.display()))?;
    tmp_file
        .write_all(content)
        .with_context(|| format!("Failed to write temporary file: {}", tmp_path.display()))?;
    tmp_file
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file: {}", tmp_path.display()))?;
    drop(tmp_file);

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e)
            .with_context(|| format!("Failed to move temporary file into place: {}", path.display()));
    }
    Ok(())
}

/// Reads a file to a UTF-8 string with a path-bearing error.
pub fn read_text_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Writes a UTF-8 string to a file atomically, creating parent directories.
pub fn write_text_file(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Serializes a value as pretty-printed JSON and writes it atomically.
///
/// A trailing newline is appended so the output matches what editors and
/// formatters produce for checked-in JSON files.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize JSON for: {}", path.display()))?;
    content.push('\n');
    atomic_write(path, content.as_bytes())
}

/// Normalizes a path lexically, resolving `.` and `..` components.
///
/// Unlike [`std::fs::canonicalize`], this does not touch the file system and
/// works for paths that do not exist yet. `..` components that would climb
/// above the start of the path are dropped.
///
/// # Examples
///
/// ```rust
/// use zuro_cli::utils::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let normalized = normalize_path(Path::new("src/./routes/../db/index.ts"));
/// assert_eq!(normalized, PathBuf::from("src/db/index.ts"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                }
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}
