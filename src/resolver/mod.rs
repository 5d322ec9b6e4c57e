//! Module dependency resolution via signature files
//!
//! Zuro keeps no ledger of installed modules. Install state is derived on
//! demand by probing for each module's **signature file**: a project-relative
//! path whose existence implies the module is present. The probe table is an
//! explicit constant so the mapping stays testable in one place.
//!
//! Detection is deliberately conservative. A false negative only triggers a
//! redundant install, which is safe because installs are idempotent; a false
//! positive silently skips a dependency, so signature paths are chosen to be
//! files only the module itself scaffolds.
//!
//! The abstract dependency name `database` is satisfied by either concrete
//! dialect module. When neither dialect is present, the caller runs the
//! interactive dialect-selection flow rather than failing.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Module name to signature file, relative to the project's source directory.
///
/// A module is considered installed when its signature file exists. Both
/// database dialects share one signature because they scaffold the same
/// entrypoint.
pub const SIGNATURE_FILES: &[(&str, &str)] = &[
    ("core", "env.ts"),
    ("database-pg", "db/index.ts"),
    ("database-mysql", "db/index.ts"),
    ("validator", "middleware/validate.ts"),
    ("error-handler", "lib/errors.ts"),
    ("logger", "lib/logger.ts"),
    ("auth", "lib/auth.ts"),
    ("docs", "routes/docs.routes.ts"),
];

/// The abstract dependency name resolved to a concrete dialect at install
/// time.
pub const DATABASE_ABSTRACT: &str = "database";

/// The concrete modules behind [`DATABASE_ABSTRACT`].
pub const DATABASE_DIALECTS: [&str; 2] = ["database-pg", "database-mysql"];

/// Looks up the signature file for a module.
#[must_use]
pub fn signature_path(module: &str) -> Option<&'static str> {
    SIGNATURE_FILES.iter().find(|(name, _)| *name == module).map(|(_, path)| *path)
}

/// Checks whether a module's signature file exists.
///
/// The abstract `database` name checks both dialect signatures. Modules
/// without a table entry report not-installed.
#[must_use]
pub fn is_module_installed(project_root: &Path, src_dir: &str, module: &str) -> bool {
    if module == DATABASE_ABSTRACT {
        return DATABASE_DIALECTS
            .iter()
            .any(|dialect| is_module_installed(project_root, src_dir, dialect));
    }

    signature_path(module)
        .is_some_and(|signature| project_root.join(src_dir).join(signature).exists())
}

/// Derives the set of installed modules by probing every signature file.
#[must_use]
pub fn installed_modules(project_root: &Path, src_dir: &str) -> BTreeSet<&'static str> {
    SIGNATURE_FILES
        .iter()
        .filter(|(_, signature)| project_root.join(src_dir).join(signature).exists())
        .map(|(name, _)| *name)
        .collect()
}

/// Filters a module's declared dependencies down to the ones still missing.
///
/// Declaration order is preserved so installs happen in the order the
/// registry author wrote them. Names without a signature entry are skipped:
/// there is no way to probe them, and failing would block modules that
/// declare forward-looking dependencies.
#[must_use]
pub fn missing_dependencies(
    module_dependencies: &[String],
    project_root: &Path,
    src_dir: &str,
) -> Vec<String> {
    let mut missing = Vec::new();

    for dependency in module_dependencies {
        if dependency != DATABASE_ABSTRACT && signature_path(dependency).is_none() {
            debug!(dependency = %dependency, "No signature file known, skipping dependency check");
            continue;
        }

        if is_module_installed(project_root, src_dir, dependency) {
            debug!(dependency = %dependency, "Dependency already satisfied");
            continue;
        }

        missing.push(dependency.clone());
    }

    missing
}
