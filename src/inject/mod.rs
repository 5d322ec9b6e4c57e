//! Idempotent source injection into generated entrypoint files
//!
//! Installing a module often requires rewiring an existing generated file:
//! adding an import and a mount line to `app.ts`, or registering a module's
//! OpenAPI paths inside `lib/openapi.ts`. This module performs those merges
//! idempotently, so running the same install twice leaves the file
//! byte-identical to a single run, and a partially hand-edited file (import
//! present, usage missing, or vice versa) is repaired rather than duplicated.
//!
//! Each injectable unit is described by an [`InjectionSpec`]: the target
//! file, the exact import lines required, and the usage lines required
//! together with a presence pattern and an anchor. One generic merge routine,
//! [`ensure_injected`], interprets the spec in three parts:
//!
//! 1. **Imports**: any required import line not already present (textual
//!    containment) is appended after the last top-level `import` statement.
//! 2. **Usages**: any required usage line whose presence pattern does not
//!    match is inserted immediately before the spec's anchor line.
//! 3. **Write-back**: the file is rewritten only if something changed.
//!
//! The merge is a string-pattern heuristic, not a parser. That is acceptable
//! because the mutated files are machine-generated with a known, stable
//! shape; when the shape is not recognizable (file missing, no import block,
//! anchor not found) the injection reports `false` **without writing
//! anything**, and the caller surfaces manual instructions instead of
//! aborting the install.

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::utils::{read_text_file, write_text_file};

/// A required usage line together with its presence pattern.
///
/// The insert line is exact text; the pattern is a targeted regex that
/// tolerates formatting variation when deciding whether the usage already
/// exists.
#[derive(Debug, Clone, Copy)]
pub struct UsageSpec {
    /// The line inserted when missing.
    pub line: &'static str,
    /// Regex detecting an existing equivalent of the line.
    pub pattern: &'static str,
}

/// One injectable unit: what to merge into which generated file.
#[derive(Debug, Clone, Copy)]
pub struct InjectionSpec {
    /// Short human-readable name used in logs and warnings.
    pub label: &'static str,
    /// Target file, relative to the project's source directory.
    pub file: &'static str,
    /// Exact import lines that must be present.
    pub imports: &'static [&'static str],
    /// Usage lines that must be present, inserted in declaration order.
    pub usages: &'static [UsageSpec],
    /// Regex for the line the usage block is inserted before.
    pub anchor: &'static str,
}

/// Mounts the better-auth handler in `app.ts`.
///
/// The mount must precede the JSON body parser: better-auth consumes the raw
/// request body, so it anchors before `app.use(express.json());` rather than
/// before the default export.
pub const AUTH_ROUTES_INJECTION: InjectionSpec = InjectionSpec {
    label: "auth route mount",
    file: "app.ts",
    imports: &[
        "import { toNodeHandler } from \"better-auth/node\";",
        "import { auth } from \"./lib/auth\";",
    ],
    usages: &[UsageSpec {
        line: "app.all(\"/api/auth/*\", toNodeHandler(auth));",
        pattern: r#"app\.all\(\s*["']/api/auth/\*["']\s*,\s*toNodeHandler\(auth\)"#,
    }],
    anchor: r"(?m)^app\.use\(express\.json\(\)\);",
};

/// Registers the error-handling middleware last, before the default export.
pub const ERROR_HANDLER_INJECTION: InjectionSpec = InjectionSpec {
    label: "error handler registration",
    file: "app.ts",
    imports: &["import { errorHandler } from \"./middleware/error-handler\";"],
    usages: &[UsageSpec {
        line: "app.use(errorHandler);",
        pattern: r"app\.use\(\s*errorHandler\s*\)",
    }],
    anchor: r"(?m)^export default \w+;",
};

/// Mounts the API reference router in `app.ts`.
pub const DOCS_ROUTES_INJECTION: InjectionSpec = InjectionSpec {
    label: "docs route mount",
    file: "app.ts",
    imports: &["import docsRouter from \"./routes/docs.routes\";"],
    usages: &[UsageSpec {
        line: "app.use(\"/api/docs\", docsRouter);",
        pattern: r#"app\.use\(\s*["']/api/docs["']\s*,\s*docsRouter\s*\)"#,
    }],
    anchor: r"(?m)^export default \w+;",
};

/// Registers the auth module's OpenAPI paths inside `lib/openapi.ts`.
///
/// The docs template carries an explicit marker block for module
/// registrations, so the anchor is the end marker rather than a structural
/// pattern.
pub const AUTH_DOCS_INJECTION: InjectionSpec = InjectionSpec {
    label: "auth OpenAPI registration",
    file: "lib/openapi.ts",
    imports: &["import { registerAuthPaths } from \"./openapi.auth\";"],
    usages: &[UsageSpec {
        line: "registerAuthPaths(registry);",
        pattern: r"registerAuthPaths\(\s*registry\s*\)",
    }],
    anchor: r"(?m)^// ZURO_DOCS_MODULES_END",
};

/// Injects the auth route mount into `app.ts`.
///
/// # Errors
///
/// Returns an error only for I/O failures; an unrecognizable file shape
/// yields `Ok(false)`.
pub fn inject_auth_routes(project_root: &Path, src_dir: &str) -> Result<bool> {
    ensure_injected(project_root, src_dir, &AUTH_ROUTES_INJECTION)
}

/// Injects the error handler registration into `app.ts`.
///
/// # Errors
///
/// Returns an error only for I/O failures.
pub fn inject_error_handler(project_root: &Path, src_dir: &str) -> Result<bool> {
    ensure_injected(project_root, src_dir, &ERROR_HANDLER_INJECTION)
}

/// Injects the docs route mount into `app.ts`.
///
/// # Errors
///
/// Returns an error only for I/O failures.
pub fn inject_docs_routes(project_root: &Path, src_dir: &str) -> Result<bool> {
    ensure_injected(project_root, src_dir, &DOCS_ROUTES_INJECTION)
}

/// Registers auth OpenAPI paths inside the docs registry file.
///
/// # Errors
///
/// Returns an error only for I/O failures.
pub fn inject_auth_docs(project_root: &Path, src_dir: &str) -> Result<bool> {
    ensure_injected(project_root, src_dir, &AUTH_DOCS_INJECTION)
}

/// Runs the generic three-part merge for one injection spec.
///
/// Returns `Ok(true)` when both imports and usages end in a satisfied state,
/// `Ok(false)` when the target file is missing or no anchor point could be
/// found. In the `false` case the file is guaranteed untouched.
///
/// # Errors
///
/// Returns an error for I/O failures and for invalid presence patterns.
pub fn ensure_injected(project_root: &Path, src_dir: &str, spec: &InjectionSpec) -> Result<bool> {
    let path = project_root.join(src_dir).join(spec.file);
    if !path.exists() {
        debug!(file = %path.display(), label = spec.label, "Injection target missing");
        return Ok(false);
    }

    let original = read_text_file(&path)?;
    let mut working = original.clone();

    let missing_imports: Vec<&str> =
        spec.imports.iter().copied().filter(|line| !working.contains(line)).collect();
    if !missing_imports.is_empty() {
        let import_re = Regex::new(r"(?m)^import .+;\r?$")?;
        match insert_after_last_match(&working, &import_re, &missing_imports) {
            Some(updated) => working = updated,
            None => {
                debug!(file = %path.display(), label = spec.label, "No import block found");
                return Ok(false);
            }
        }
    }

    let mut missing_usages = Vec::new();
    for usage in spec.usages {
        if !Regex::new(usage.pattern)?.is_match(&working) {
            missing_usages.push(usage.line);
        }
    }
    if !missing_usages.is_empty() {
        let anchor_re = Regex::new(spec.anchor)?;
        match insert_before_first_match(&working, &anchor_re, &missing_usages) {
            Some(updated) => working = updated,
            None => {
                debug!(file = %path.display(), label = spec.label, "Anchor not found");
                return Ok(false);
            }
        }
    }

    if working != original {
        write_text_file(&path, &working)?;
        debug!(file = %path.display(), label = spec.label, "Injected");
    } else {
        debug!(file = %path.display(), label = spec.label, "Already satisfied");
    }

    Ok(true)
}

/// Inserts lines on their own lines after the last match of `re`.
///
/// Returns `None` when the pattern does not match at all.
fn insert_after_last_match(content: &str, re: &Regex, lines: &[&str]) -> Option<String> {
    let last = re.find_iter(content).last()?;
    let insert_at = content[last.end()..]
        .find('\n')
        .map_or(content.len(), |offset| last.end() + offset + 1);

    let mut result = String::with_capacity(content.len() + block_len(lines));
    result.push_str(&content[..insert_at]);
    if !result.ends_with('\n') {
        result.push('\n');
    }
    for line in lines {
        result.push_str(line);
        result.push('\n');
    }
    result.push_str(&content[insert_at..]);
    Some(result)
}

/// Inserts lines on their own lines immediately before the first match of
/// `re`, at the start of the matched line.
///
/// Returns `None` when the pattern does not match at all.
fn insert_before_first_match(content: &str, re: &Regex, lines: &[&str]) -> Option<String> {
    let first = re.find(content)?;
    let line_start = content[..first.start()].rfind('\n').map_or(0, |i| i + 1);

    let mut result = String::with_capacity(content.len() + block_len(lines));
    result.push_str(&content[..line_start]);
    for line in lines {
        result.push_str(line);
        result.push('\n');
    }
    result.push_str(&content[line_start..]);
    Some(result)
}

fn block_len(lines: &[&str]) -> usize {
    lines.iter().map(|line| line.len() + 1).sum()
}
