//! Add a Zuro module to the current project.
//!
//! The `add` command resolves a module against the registry manifest,
//! installs its npm dependencies with the project's package manager,
//! scaffolds its template files, and wires generated entrypoints into the
//! Express application. Module dependencies are installed first, so
//! `zuro add docs` on a bare project pulls in whatever the docs module
//! requires before its own files land.
//!
//! Database modules get special handling:
//!
//! - `zuro add database` prompts for a concrete dialect and installs that.
//! - Adding a dialect while a database module is already installed asks for
//!   confirmation and snapshots the current database files under
//!   `.zuro/backups/` before they are overwritten.
//!
//! # Examples
//!
//! ```bash
//! zuro add auth
//! zuro add database
//! zuro add error-handler
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::collections::BTreeSet;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::backup::backup_database_files;
use crate::cli::common::{
    SelectOption, confirm, print_cancelled, prompt_select, stdin_is_interactive, step_fail,
    step_start, step_succeed,
};
use crate::env::{env_config_for, update_env_file, update_env_schema};
use crate::inject::{
    AUTH_DOCS_INJECTION, AUTH_ROUTES_INJECTION, DOCS_ROUTES_INJECTION, ERROR_HANDLER_INJECTION,
    InjectionSpec, ensure_injected,
};
use crate::pm::{PackageManager, install_packages};
use crate::project::ensure_managed;
use crate::registry::{RegistryClient, ResolvedRegistry, find_module};
use crate::resolver::{
    DATABASE_ABSTRACT, DATABASE_DIALECTS, is_module_installed, missing_dependencies,
};
use crate::scaffold::write_module_file;

const DIALECT_CHOICES: [SelectOption; 2] = [
    SelectOption { title: "PostgreSQL", value: "database-pg" },
    SelectOption { title: "MySQL", value: "database-mysql" },
];

/// Command to add a registry module to a Zuro project.
#[derive(Args)]
pub struct AddCommand {
    /// Name of the module to add (for example `auth` or `database`)
    pub module: String,
}

impl AddCommand {
    /// Execute the add command from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is not a Zuro project, the registry
    /// cannot be reached, the module does not exist, or installation fails.
    pub async fn execute(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        self.execute_from(&cwd).await
    }

    /// Execute the add command against an explicit project root.
    ///
    /// # Errors
    ///
    /// Same conditions as [`execute`](Self::execute).
    pub async fn execute_from(self, project_root: &Path) -> Result<()> {
        let config = ensure_managed(project_root)?;
        let src_dir = config.src_dir_or_default().to_string();
        let pm = config.pm_or_detect(project_root);

        // The abstract database module resolves to a dialect before
        // anything else happens, matching what installing it would do.
        let module_name = if self.module == DATABASE_ABSTRACT {
            match choose_database_dialect().await? {
                Some(dialect) => dialect,
                None => {
                    print_cancelled();
                    return Ok(());
                }
            }
        } else {
            self.module
        };

        let client = RegistryClient::from_env()?;
        let spinner = step_start("Connecting to Zuro registry...");
        let registry = match client.fetch_registry().await {
            Ok(registry) => registry,
            Err(error) => {
                step_fail(&spinner, "Failed to connect to the Zuro registry");
                return Err(error);
            }
        };
        step_succeed(&spinner, "Connected to Zuro registry");

        let ctx = InstallContext { client: &client, registry, project_root, src_dir, pm };
        let mut attempted = BTreeSet::new();
        match install_module(&ctx, module_name.clone(), &mut attempted).await {
            Ok(_) => Ok(()),
            Err(error) => {
                println!("\n{}", "To retry, run:".yellow());
                println!("    {}", format!("zuro add {module_name}").cyan());
                Err(error)
            }
        }
    }
}

/// Everything an installation needs, shared across dependency recursion.
struct InstallContext<'a> {
    client: &'a RegistryClient,
    registry: ResolvedRegistry,
    project_root: &'a Path,
    src_dir: String,
    pm: PackageManager,
}

/// Installs a module and, first, any of its module dependencies that are
/// not already present.
///
/// Returns `Ok(false)` when the user cancelled at a prompt; the caller
/// stops without treating that as a failure. `attempted` guards against
/// dependency cycles and duplicate work within one invocation.
fn install_module<'a>(
    ctx: &'a InstallContext<'a>,
    module_name: String,
    attempted: &'a mut BTreeSet<String>,
) -> Pin<Box<dyn Future<Output = Result<bool>> + 'a>> {
    Box::pin(async move {
        if !attempted.insert(module_name.clone()) {
            return Ok(true);
        }

        let spinner = step_start(format!("Checking registry for {module_name}..."));
        let module = match find_module(&ctx.registry.manifest, &module_name) {
            Ok(module) => module.clone(),
            Err(error) => {
                step_fail(&spinner, format!("Module '{module_name}' not found."));
                return Err(error.into());
            }
        };
        step_succeed(&spinner, format!("Found module: {}", module_name.cyan()));

        let missing =
            missing_dependencies(&module.module_dependencies, ctx.project_root, &ctx.src_dir);
        if !missing.is_empty() {
            println!(
                "{}",
                format!("Module '{}' requires: {}", module_name, missing.join(", ")).cyan()
            );
            for dep in missing {
                let dep = if dep == DATABASE_ABSTRACT {
                    match choose_database_dialect().await? {
                        Some(dialect) => dialect,
                        None => {
                            print_cancelled();
                            return Ok(false);
                        }
                    }
                } else {
                    dep
                };
                if !install_module(ctx, dep, &mut *attempted).await? {
                    return Ok(false);
                }
            }
        }

        // Replacing an installed database module is destructive, so it
        // needs confirmation and a snapshot of the current files.
        let mut overwrite_env = false;
        if DATABASE_DIALECTS.contains(&module_name.as_str())
            && is_module_installed(ctx.project_root, &ctx.src_dir, &module_name)
        {
            let Some(true) =
                confirm("Switching database dialects overwrites your db/ files. Continue?", false)
                    .await?
            else {
                print_cancelled();
                return Ok(false);
            };
            if let Some(backup_dir) = backup_database_files(ctx.project_root, &ctx.src_dir)? {
                println!(
                    "{}",
                    format!("Backed up existing database files to {}", backup_dir.display())
                        .dimmed()
                );
            }
            overwrite_env = true;
        }

        let spinner = step_start("Installing dependencies...");
        if let Err(error) =
            install_packages(ctx.pm, &module.dependencies, ctx.project_root, false).await
        {
            step_fail(&spinner, "Failed to install dependencies");
            return Err(error);
        }
        if let Err(error) =
            install_packages(ctx.pm, &module.dev_dependencies, ctx.project_root, true).await
        {
            step_fail(&spinner, "Failed to install dependencies");
            return Err(error);
        }
        step_succeed(&spinner, "Dependencies installed");

        let spinner = step_start("Scaffolding files...");
        for file in &module.files {
            let content = match ctx.client.fetch_file(&ctx.registry.file_base_url, file).await {
                Ok(content) => content,
                Err(error) => {
                    step_fail(&spinner, format!("Failed to fetch {}", file.target));
                    return Err(error);
                }
            };
            if let Err(error) = write_module_file(ctx.project_root, &ctx.src_dir, file, &content) {
                step_fail(&spinner, format!("Failed to write {}", file.target));
                return Err(error);
            }
        }
        step_succeed(&spinner, "Files generated");

        wire_entrypoints(ctx, &module_name)?;

        if let Some(env_config) = env_config_for(&module_name) {
            update_env_file(ctx.project_root, env_config.vars, true, overwrite_env)?;
            if !update_env_schema(ctx.project_root, &ctx.src_dir, env_config.schema_fields)? {
                let names: Vec<&str> =
                    env_config.schema_fields.iter().map(|(name, _)| *name).collect();
                println!(
                    "{}",
                    format!(
                        "⚠ Could not update the env schema. Add these fields to {}/env.ts yourself: {}",
                        ctx.src_dir,
                        names.join(", ")
                    )
                    .yellow()
                );
            }
        }

        println!("\n{}", format!("✔ {module_name} added successfully!").green());
        if module_name.contains("database") {
            println!("{}", "Action Required: Update DATABASE_URL in your .env file!".yellow());
        }
        Ok(true)
    })
}

/// Resolves the abstract `database` module to a concrete dialect.
///
/// Returns `Ok(None)` when the user dismisses the prompt. Without a
/// terminal this is an error: there is no sensible default dialect.
async fn choose_database_dialect() -> Result<Option<String>> {
    if !stdin_is_interactive() {
        bail!(
            "A database dialect must be chosen interactively. \
             Run 'zuro add database-pg' or 'zuro add database-mysql' instead."
        );
    }
    let Some(choice) = prompt_select("Which database dialect?", &DIALECT_CHOICES).await? else {
        return Ok(None);
    };
    Ok(Some(DIALECT_CHOICES[choice].value.to_string()))
}

/// Wires a freshly scaffolded module into the generated entrypoints.
///
/// The auth and docs modules converge on the same OpenAPI registration:
/// whichever of the two is added second triggers it.
fn wire_entrypoints(ctx: &InstallContext<'_>, module_name: &str) -> Result<()> {
    let mut pending: Vec<InjectionSpec> = Vec::new();
    match module_name {
        "auth" => {
            pending.push(AUTH_ROUTES_INJECTION);
            if is_module_installed(ctx.project_root, &ctx.src_dir, "docs") {
                pending.push(AUTH_DOCS_INJECTION);
            }
        }
        "error-handler" => pending.push(ERROR_HANDLER_INJECTION),
        "docs" => {
            pending.push(DOCS_ROUTES_INJECTION);
            if is_module_installed(ctx.project_root, &ctx.src_dir, "auth") {
                pending.push(AUTH_DOCS_INJECTION);
            }
        }
        _ => return Ok(()),
    }

    let spinner = step_start("Wiring entrypoints...");
    let mut unwired = Vec::new();
    for spec in pending {
        match ensure_injected(ctx.project_root, &ctx.src_dir, &spec) {
            Ok(true) => {}
            Ok(false) => unwired.push(spec),
            Err(error) => {
                step_fail(&spinner, "Failed to wire entrypoints");
                return Err(error);
            }
        }
    }
    step_succeed(&spinner, "Entrypoints wired");

    for spec in &unwired {
        print_manual_wiring(spec);
    }
    Ok(())
}

fn print_manual_wiring(spec: &InjectionSpec) {
    println!(
        "{}",
        format!(
            "⚠ Could not wire the {} into {} automatically. Add the following lines yourself:",
            spec.label, spec.file
        )
        .yellow()
    );
    for import in spec.imports {
        println!("    {}", import.dimmed());
    }
    for usage in spec.usages {
        println!("    {}", usage.line.dimmed());
    }
}
