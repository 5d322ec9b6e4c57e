//! Per-project configuration (`zuro.json`)
//!
//! The presence of a valid `zuro.json` is the sole signal that a directory is
//! managed by Zuro. Every mutating command reads it first and refuses to
//! touch a directory it does not own.
//!
//! Reads are deliberately forgiving: a missing or unparsable file yields
//! `None` rather than an error, and individual fields are sanitized so a
//! hand-edited config degrades field by field instead of crashing later
//! commands. Writes go through the same sanitization, serialize with two
//! space indentation, and land atomically.

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::{DEFAULT_SRC_DIR, PROJECT_CONFIG_FILE};
use crate::core::ZuroError;
use crate::pm::PackageManager;
use crate::utils::{read_text_file, write_json_file};

/// The persisted per-project configuration.
///
/// Created once by `init`, read by every subsequent command. All fields are
/// optional on disk; missing values fall back to detection (`pm`) or
/// defaults (`src_dir`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    /// Project name as chosen at init time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package manager recorded for this project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pm: Option<PackageManager>,

    /// Source directory module files are scaffolded into, relative to the
    /// project root.
    #[serde(rename = "srcDir", skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,
}

impl ProjectConfig {
    /// The configured source directory, falling back to `src`.
    #[must_use]
    pub fn src_dir_or_default(&self) -> &str {
        self.src_dir.as_deref().unwrap_or(DEFAULT_SRC_DIR)
    }

    /// The recorded package manager, falling back to lock-file detection.
    #[must_use]
    pub fn pm_or_detect(&self, project_root: &Path) -> PackageManager {
        self.pm.unwrap_or_else(|| PackageManager::detect(project_root))
    }
}

/// Path of the config file inside a project.
#[must_use]
pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

/// Reads a project's configuration.
///
/// Returns `Ok(None)` when the file is missing or does not parse as JSON;
/// absence of a valid config is a state, not a failure. Unknown keys and
/// wrong-typed values are dropped.
///
/// # Errors
///
/// Returns an error only for real I/O failures such as permission problems.
pub fn read_config(project_root: &Path) -> Result<Option<ProjectConfig>> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(None);
    }

    let content = read_text_file(&path)?;
    match serde_json::from_str::<Value>(&content) {
        Ok(value) => Ok(Some(sanitize(&value))),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring unparsable project config");
            Ok(None)
        }
    }
}

/// Writes a project's configuration, sanitized, with pretty indentation.
///
/// # Errors
///
/// Returns an error if serialization or the atomic write fails.
pub fn write_config(project_root: &Path, config: &ProjectConfig) -> Result<()> {
    write_json_file(&config_path(project_root), config)
}

/// Reads the config, treating its absence as a refusal to proceed.
///
/// This is the managed-project gate used by `add`: the error carries the
/// explanation of why Zuro stops rather than adopting a foreign project.
///
/// # Errors
///
/// Returns [`ZuroError::ProjectNotManaged`] when no valid config exists.
pub fn ensure_managed(project_root: &Path) -> Result<ProjectConfig> {
    match read_config(project_root)? {
        Some(config) => Ok(config),
        None => Err(ZuroError::ProjectNotManaged.into()),
    }
}

/// Extracts known, correctly-typed fields from a raw JSON value.
fn sanitize(value: &Value) -> ProjectConfig {
    let mut config = ProjectConfig::default();

    let Some(object) = value.as_object() else {
        return config;
    };

    if let Some(name) = object.get("name").and_then(Value::as_str) {
        config.name = Some(name.to_string());
    }
    if let Some(pm) = object.get("pm").and_then(Value::as_str) {
        // Unknown manager names degrade to detection, same as a missing key.
        config.pm = PackageManager::parse(pm);
    }
    if let Some(src_dir) = object.get("srcDir").and_then(Value::as_str) {
        config.src_dir = Some(src_dir.to_string());
    }

    config
}
