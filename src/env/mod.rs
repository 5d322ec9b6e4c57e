//! Environment file and schema management
//!
//! Modules that need configuration ship a set of environment variables and
//! matching zod schema fields. This module merges both into the project:
//! variables into the root `.env` file, schema fields into the generated
//! `env.ts` validation schema. Both merges are additive and idempotent, and
//! neither ever clobbers a value the user changed by hand.

use anyhow::Result;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::utils::{line_ending, read_text_file, write_text_file};

const ENV_FILE: &str = ".env";
const ENV_SCHEMA_FILE: &str = "env.ts";

/// Environment variables and schema fields carried by a module.
#[derive(Debug, Clone, Copy)]
pub struct ModuleEnvConfig {
    /// `KEY=value` pairs merged into `.env`.
    pub vars: &'static [(&'static str, &'static str)],
    /// `name: zodSchema` pairs merged into the `env.ts` schema object.
    pub schema_fields: &'static [(&'static str, &'static str)],
}

const DATABASE_URL_SCHEMA: &str = "z.string().url()";

/// Looks up the environment configuration for a module, if it has one.
#[must_use]
pub fn env_config_for(module: &str) -> Option<&'static ModuleEnvConfig> {
    match module {
        "database-pg" => Some(&ModuleEnvConfig {
            vars: &[("DATABASE_URL", "postgresql://postgres@localhost:5432/mydb")],
            schema_fields: &[("DATABASE_URL", DATABASE_URL_SCHEMA)],
        }),
        "database-mysql" => Some(&ModuleEnvConfig {
            vars: &[("DATABASE_URL", "mysql://root@localhost:3306/mydb")],
            schema_fields: &[("DATABASE_URL", DATABASE_URL_SCHEMA)],
        }),
        "auth" => Some(&ModuleEnvConfig {
            vars: &[
                ("BETTER_AUTH_SECRET", "your-secret-key-at-least-32-characters-long"),
                ("BETTER_AUTH_URL", "http://localhost:3000"),
            ],
            schema_fields: &[
                ("BETTER_AUTH_SECRET", "z.string().min(32)"),
                ("BETTER_AUTH_URL", "z.string().url()"),
            ],
        }),
        _ => None,
    }
}

/// Merges variables into the project's `.env` file.
///
/// A key already present in the file is left untouched unless
/// `overwrite_existing` is set, in which case its first occurrence is
/// replaced in place and every other line is preserved. Missing keys are
/// appended using the platform line ending. When the file does not exist it
/// is only created if `create_if_missing` is set.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn update_env_file(
    project_root: &Path,
    vars: &[(&str, &str)],
    create_if_missing: bool,
    overwrite_existing: bool,
) -> Result<()> {
    let path = project_root.join(ENV_FILE);
    let existed = path.exists();
    if !existed && !create_if_missing {
        debug!(file = %path.display(), "No .env file and creation not requested");
        return Ok(());
    }

    let mut content = if existed { read_text_file(&path)? } else { String::new() };
    let mut modified = false;

    for (key, value) in vars {
        let presence = Regex::new(&format!(r"(?m)^{}=", regex::escape(key)))?;
        if presence.is_match(&content) {
            if overwrite_existing {
                let line = Regex::new(&format!(r"(?m)^{}=[^\r\n]*", regex::escape(key)))?;
                let replaced = line
                    .replace(&content, format!("{key}={value}").as_str())
                    .into_owned();
                if replaced != content {
                    content = replaced;
                    modified = true;
                    debug!(key, "Replaced existing .env entry");
                }
            } else {
                debug!(key, "Keeping existing .env entry");
            }
        } else {
            if !content.is_empty() && !content.ends_with('\n') {
                content.push_str(line_ending());
            }
            content.push_str(key);
            content.push('=');
            content.push_str(value);
            content.push_str(line_ending());
            modified = true;
            debug!(key, "Appended .env entry");
        }
    }

    if modified || !existed {
        write_text_file(&path, &content)?;
    }
    Ok(())
}

/// Merges schema fields into the `env.ts` validation schema.
///
/// A field whose name already appears in the file is skipped. Missing
/// fields are inserted before the schema object's closing brace, matching
/// the generated file's indentation. Returns whether the schema now covers
/// every requested field; a missing schema file or an unrecognizable one is
/// reported as uncovered so callers can warn instead of aborting.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn update_env_schema(
    project_root: &Path,
    src_dir: &str,
    fields: &[(&str, &str)],
) -> Result<bool> {
    let path = project_root.join(src_dir).join(ENV_SCHEMA_FILE);
    if !path.exists() {
        debug!(file = %path.display(), "No env schema file");
        return Ok(false);
    }

    let original = read_text_file(&path)?;
    let mut content = original.clone();
    let closing = Regex::new(r"(\n\s*)(\}\);?\s*\n\s*export const env)")?;
    let mut covered = true;

    for (name, schema) in fields {
        if content.contains(&format!("{name}:")) {
            debug!(field = name, "Schema field already present");
            continue;
        }
        let insertion = format!("\n    {name}: {schema},${{1}}${{2}}");
        let replaced = closing.replace(&content, insertion.as_str()).into_owned();
        if replaced == content {
            debug!(field = name, "Schema insertion point not found");
            covered = false;
        } else {
            content = replaced;
            debug!(field = name, "Inserted schema field");
        }
    }

    if content != original {
        write_text_file(&path, &content)?;
    }
    Ok(covered)
}

/// Creates a starter `.env` file if none exists yet.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_initial_env(project_root: &Path) -> Result<()> {
    let path = project_root.join(ENV_FILE);
    if path.exists() {
        return Ok(());
    }
    write_text_file(&path, "# Environment Variables\nPORT=3000\nNODE_ENV=development\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ENV_TS: &str = "\
import { z } from \"zod\";
import \"dotenv/config\";

const envSchema = z.object({
    PORT: z.coerce.number().default(3000),
    NODE_ENV: z.string().default(\"development\"),
});

export const env = envSchema.parse(process.env);
";

    fn read_env(root: &Path) -> String {
        std::fs::read_to_string(root.join(".env")).unwrap()
    }

    #[test]
    fn test_append_missing_vars() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "PORT=3000\n").unwrap();

        update_env_file(temp.path(), &[("DATABASE_URL", "postgresql://localhost/db")], false, false)
            .unwrap();

        let content = read_env(temp.path());
        assert!(content.starts_with("PORT=3000\n"));
        assert!(content.contains("DATABASE_URL=postgresql://localhost/db"));
    }

    #[test]
    fn test_pads_missing_trailing_newline_before_append() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "PORT=3000").unwrap();

        update_env_file(temp.path(), &[("NODE_ENV", "development")], false, false).unwrap();

        let content = read_env(temp.path());
        assert!(content.contains("PORT=3000\n") || content.contains("PORT=3000\r\n"));
        assert!(!content.contains("PORT=3000NODE_ENV"));
    }

    #[test]
    fn test_existing_key_kept_by_default() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "DATABASE_URL=postgres://custom/prod\n").unwrap();

        update_env_file(temp.path(), &[("DATABASE_URL", "postgresql://localhost/db")], false, false)
            .unwrap();

        assert_eq!(read_env(temp.path()), "DATABASE_URL=postgres://custom/prod\n");
    }

    #[test]
    fn test_overwrite_replaces_in_place() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".env"),
            "PORT=3000\nDATABASE_URL=postgresql://postgres@localhost:5432/mydb\nNODE_ENV=development\n",
        )
        .unwrap();

        update_env_file(
            temp.path(),
            &[("DATABASE_URL", "mysql://root@localhost:3306/mydb")],
            false,
            true,
        )
        .unwrap();

        assert_eq!(
            read_env(temp.path()),
            "PORT=3000\nDATABASE_URL=mysql://root@localhost:3306/mydb\nNODE_ENV=development\n"
        );
    }

    #[test]
    fn test_missing_file_without_create_flag_is_noop() {
        let temp = TempDir::new().unwrap();
        update_env_file(temp.path(), &[("PORT", "3000")], false, false).unwrap();
        assert!(!temp.path().join(".env").exists());
    }

    #[test]
    fn test_missing_file_created_when_requested() {
        let temp = TempDir::new().unwrap();
        update_env_file(temp.path(), &[("PORT", "3000")], true, false).unwrap();
        assert!(read_env(temp.path()).contains("PORT=3000"));
    }

    #[test]
    fn test_schema_field_inserted_with_indentation() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/env.ts"), ENV_TS).unwrap();

        let covered =
            update_env_schema(temp.path(), "src", &[("DATABASE_URL", "z.string().url()")]).unwrap();
        assert!(covered);

        let content = std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap();
        assert!(content.contains("    DATABASE_URL: z.string().url(),\n});"));
        let field = content.find("DATABASE_URL").unwrap();
        let node_env = content.find("NODE_ENV").unwrap();
        assert!(node_env < field, "new field goes after existing fields");
    }

    #[test]
    fn test_schema_field_already_present_is_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        let with_field = ENV_TS.replace(
            "    NODE_ENV: z.string().default(\"development\"),",
            "    NODE_ENV: z.string().default(\"development\"),\n    DATABASE_URL: z.string().url(),",
        );
        std::fs::write(temp.path().join("src/env.ts"), &with_field).unwrap();

        let covered =
            update_env_schema(temp.path(), "src", &[("DATABASE_URL", "z.string().url()")]).unwrap();
        assert!(covered, "an already-present field counts as covered");
        assert_eq!(std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap(), with_field);
    }

    #[test]
    fn test_schema_missing_file_reports_uncovered() {
        let temp = TempDir::new().unwrap();
        let covered =
            update_env_schema(temp.path(), "src", &[("DATABASE_URL", "z.string().url()")]).unwrap();
        assert!(!covered);
    }

    #[test]
    fn test_schema_without_insertion_point_reports_uncovered() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/env.ts"), "export const env = {};\n").unwrap();

        let covered =
            update_env_schema(temp.path(), "src", &[("DATABASE_URL", "z.string().url()")]).unwrap();
        assert!(!covered);
        assert_eq!(
            std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap(),
            "export const env = {};\n"
        );
    }

    #[test]
    fn test_schema_merge_is_idempotent() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/env.ts"), ENV_TS).unwrap();

        let fields =
            [("BETTER_AUTH_SECRET", "z.string().min(32)"), ("BETTER_AUTH_URL", "z.string().url()")];
        assert!(update_env_schema(temp.path(), "src", &fields).unwrap());
        let first = std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap();

        assert!(update_env_schema(temp.path(), "src", &fields).unwrap());
        let second = std::fs::read_to_string(temp.path().join("src/env.ts")).unwrap();
        assert_eq!(first, second, "second merge rewrites nothing");
    }

    #[test]
    fn test_create_initial_env() {
        let temp = TempDir::new().unwrap();
        create_initial_env(temp.path()).unwrap();
        assert_eq!(read_env(temp.path()), "# Environment Variables\nPORT=3000\nNODE_ENV=development\n");
    }

    #[test]
    fn test_create_initial_env_never_clobbers() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".env"), "PORT=8080\n").unwrap();
        create_initial_env(temp.path()).unwrap();
        assert_eq!(read_env(temp.path()), "PORT=8080\n");
    }

    #[test]
    fn test_env_config_table() {
        let pg = env_config_for("database-pg").unwrap();
        assert_eq!(pg.vars[0].0, "DATABASE_URL");
        assert!(pg.vars[0].1.starts_with("postgresql://"));

        let mysql = env_config_for("database-mysql").unwrap();
        assert!(mysql.vars[0].1.starts_with("mysql://"));

        let auth = env_config_for("auth").unwrap();
        assert_eq!(auth.vars.len(), 2);
        assert_eq!(auth.schema_fields[0], ("BETTER_AUTH_SECRET", "z.string().min(32)"));

        assert!(env_config_for("logger").is_none());
    }
}
