//! Safe scaffolding of registry files into a project
//!
//! Registry file entries name a project-relative `target`, joined onto the
//! configured source directory. A target may use a single leading `../` to
//! reach project-root-level files such as `drizzle.config.ts`, so containment
//! cannot be enforced by banning `..` outright. Instead every target is
//! resolved lexically and checked against the normalized project root before
//! any write happens; escapes abort the operation with a security error.
//!
//! Scaffolding is not content-merging: an eligible target is overwritten
//! unconditionally. Which files are eligible is the caller's decision; the
//! [`is_safe_for_existing_project`] predicate encodes the conservative rule
//! used when adopting a project Zuro did not create.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::ZuroError;
use crate::registry::RegistryFile;
use crate::utils::{normalize_path, write_text_file};

/// Resolves a registry target to an absolute on-disk path, enforcing
/// containment.
///
/// The target is joined onto `{project_root}/{src_dir}` and normalized
/// lexically, so it works for files that do not exist yet. A relative
/// project root is absolutized first; otherwise excess `..` components could
/// slip past the prefix comparison.
///
/// # Errors
///
/// Returns [`ZuroError::PathEscapesProject`] when the resolved path is not
/// the project root or a descendant of it. Nothing has been written when
/// this error is returned.
pub fn resolve_safe_target_path(
    project_root: &Path,
    src_dir: &str,
    target: &str,
) -> Result<PathBuf, ZuroError> {
    let root = if project_root.is_absolute() {
        project_root.to_path_buf()
    } else {
        std::env::current_dir()?.join(project_root)
    };

    let normalized_root = normalize_path(&root);
    let resolved = normalize_path(&root.join(src_dir).join(target));

    if resolved.starts_with(&normalized_root) {
        Ok(resolved)
    } else {
        Err(ZuroError::PathEscapesProject {
            target: target.to_string(),
        })
    }
}

/// Writes fetched file content to its resolved target path.
///
/// Parent directories are created as needed and the write is atomic. The
/// target is overwritten unconditionally; eligibility filtering happens in
/// the caller.
///
/// # Errors
///
/// Returns the containment error from [`resolve_safe_target_path`] or the
/// underlying write failure.
pub fn write_module_file(
    project_root: &Path,
    src_dir: &str,
    file: &RegistryFile,
    content: &str,
) -> Result<PathBuf> {
    let target_path = resolve_safe_target_path(project_root, src_dir, &file.target)?;
    write_text_file(&target_path, content)?;
    debug!(target = %target_path.display(), "Scaffolded file");
    Ok(target_path)
}

/// Decides whether a target may be written into a pre-existing project.
///
/// Adopting a project Zuro did not create must not clobber hand-written
/// entrypoints. `app.ts` and `server.ts` are never written; beyond that,
/// only utility files are eligible: `env.ts` or anything under a `lib`
/// directory.
#[must_use]
pub fn is_safe_for_existing_project(src_dir: &str, target: &str) -> bool {
    let relative = normalize_path(&Path::new(src_dir).join(target));

    let file_name = relative.file_name().map(|n| n.to_string_lossy().to_string());
    let Some(file_name) = file_name else {
        return false;
    };

    if file_name == "app.ts" || file_name == "server.ts" {
        return false;
    }

    file_name == "env.ts" || relative.components().any(|c| c.as_os_str() == "lib")
}
