//! Initialize a Zuro project.
//!
//! The `init` command sets up a TypeScript Express API project managed by
//! Zuro: it writes the `zuro.json` project configuration, installs the
//! `core` template module from the registry, and creates a starter `.env`.
//! Two situations are handled:
//!
//! - **Fresh directory** (no `package.json`): the user is prompted for a
//!   project name and package manager, the project is created in
//!   `./<name>` with a starter `package.json`, and every core file is
//!   scaffolded.
//! - **Existing project** (`package.json` present): Zuro adapts the project
//!   instead of overwriting it. The package manager is detected from
//!   lockfiles, the user is asked where source code lives, and only files
//!   and dependencies that cannot clobber hand-written code are installed
//!   (utility files, plus the `zod`/`dotenv` runtime dependencies and the
//!   dev toolchain).
//!
//! # Examples
//!
//! ```bash
//! # Scaffold a new project interactively
//! zuro init
//!
//! # Adapt the project in the current directory
//! cd my-existing-api && zuro init
//! ```
//!
//! Dismissing the project-name prompt cancels before anything is written.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::cli::common::{
    SelectOption, print_cancelled, prompt_select, prompt_text, step_fail, step_start, step_succeed,
};
use crate::constants::DEFAULT_SRC_DIR;
use crate::env::create_initial_env;
use crate::pm::{PackageManager, install_packages};
use crate::project::{ProjectConfig, write_config};
use crate::registry::{RegistryClient, ResolvedRegistry, RegistryModule, find_module};
use crate::scaffold::{is_safe_for_existing_project, write_module_file};
use crate::utils::{ensure_dir, write_json_file};

/// The template module every project starts from.
const CORE_MODULE: &str = "core";

/// Runtime dependencies safe to add to a project Zuro did not create.
///
/// The rest of the core runtime stack (express and friends) is skipped for
/// existing projects since their entrypoints are not scaffolded either.
const SAFE_EXISTING_DEPS: [&str; 2] = ["zod", "dotenv"];

const PM_CHOICES: [SelectOption; 3] = [
    SelectOption { title: "npm", value: "npm" },
    SelectOption { title: "pnpm", value: "pnpm" },
    SelectOption { title: "bun", value: "bun" },
];

/// Command to initialize a Zuro project in the current directory.
#[derive(Args)]
pub struct InitCommand {}

impl InitCommand {
    /// Execute the init command from the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be reached, dependency
    /// installation fails, or project files cannot be written.
    pub async fn execute(self) -> Result<()> {
        let cwd = std::env::current_dir()?;
        self.execute_from(&cwd).await
    }

    /// Execute the init command against an explicit base directory.
    ///
    /// For a fresh project the new directory is created *inside* `base_dir`;
    /// for an existing project `base_dir` is the project root itself.
    ///
    /// # Errors
    ///
    /// Same conditions as [`execute`](Self::execute).
    pub async fn execute_from(self, base_dir: &Path) -> Result<()> {
        let client = RegistryClient::from_env()?;
        if base_dir.join("package.json").exists() {
            init_existing_project(base_dir, &client).await
        } else {
            init_fresh_project(base_dir, &client).await
        }
    }
}

async fn init_existing_project(project_root: &Path, client: &RegistryClient) -> Result<()> {
    println!("{}", "ℹ Existing project detected.".blue());

    let name = project_root
        .file_name()
        .map_or_else(|| "my-api".to_string(), |base| base.to_string_lossy().into_owned());
    let pm = PackageManager::detect(project_root);

    // A dismissed prompt falls back to the default here: adapting an
    // existing project only ever touches safe files.
    let src_dir = prompt_text("Where is your source code located?", DEFAULT_SRC_DIR)
        .await?
        .unwrap_or_else(|| DEFAULT_SRC_DIR.to_string());

    let config =
        ProjectConfig { name: Some(name), pm: Some(pm), src_dir: Some(src_dir.clone()) };
    write_config(project_root, &config)?;

    let spinner = step_start("Connecting to Zuro registry...");
    let (registry, core) = match fetch_core(client).await {
        Ok(resolved) => resolved,
        Err(error) => {
            step_fail(&spinner, "Failed to initialize project");
            return Err(error);
        }
    };

    spinner.set_message(format!("Installing dependencies using {pm}..."));
    let safe_runtime: Vec<String> = core
        .dependencies
        .iter()
        .filter(|dep| SAFE_EXISTING_DEPS.contains(&dep.as_str()))
        .cloned()
        .collect();
    if let Err(error) = install_packages(pm, &safe_runtime, project_root, false).await {
        step_fail(&spinner, "Failed to install dependencies");
        return Err(error);
    }
    if let Err(error) = install_packages(pm, &core.dev_dependencies, project_root, true).await {
        step_fail(&spinner, "Failed to install dependencies");
        return Err(error);
    }

    spinner.set_message("Fetching core module files...");
    for file in &core.files {
        if !is_safe_for_existing_project(&src_dir, &file.target) {
            debug!(target = %file.target, "Skipping file, unsafe for an existing project");
            continue;
        }
        if let Err(error) = scaffold_file(client, &registry, project_root, &src_dir, file).await {
            step_fail(&spinner, "Failed to fetch core module files");
            return Err(error);
        }
    }

    create_initial_env(project_root)?;

    step_succeed(
        &spinner,
        format!("Project initialized in {} using {}!", project_root.display(), pm),
    );
    Ok(())
}

async fn init_fresh_project(base_dir: &Path, client: &RegistryClient) -> Result<()> {
    let Some(name) = prompt_text("Project Name?", "my-api").await? else {
        print_cancelled();
        return Ok(());
    };
    if name.contains('/') || name.contains('\\') {
        bail!("Project name must not contain path separators");
    }

    let Some(choice) = prompt_select("Package Manager?", &PM_CHOICES).await? else {
        print_cancelled();
        return Ok(());
    };
    let pm = PackageManager::parse(PM_CHOICES[choice].value).unwrap_or(PackageManager::Npm);

    let project_root = base_dir.join(&name);
    ensure_dir(&project_root)?;

    let config = ProjectConfig {
        name: Some(name),
        pm: Some(pm),
        src_dir: Some(DEFAULT_SRC_DIR.to_string()),
    };
    write_config(&project_root, &config)?;

    let spinner = step_start("Connecting to Zuro registry...");
    let (registry, core) = match fetch_core(client).await {
        Ok(resolved) => resolved,
        Err(error) => {
            step_fail(&spinner, "Failed to initialize project");
            return Err(error);
        }
    };

    spinner.set_message("Initializing project...");
    if let Err(error) = write_json_file(&project_root.join("package.json"), &starter_package()) {
        step_fail(&spinner, "Failed to write package.json");
        return Err(error);
    }

    spinner.set_message(format!("Installing dependencies using {pm}..."));
    if let Err(error) = install_packages(pm, &core.dependencies, &project_root, false).await {
        step_fail(&spinner, "Failed to install dependencies");
        return Err(error);
    }
    if let Err(error) = install_packages(pm, &core.dev_dependencies, &project_root, true).await {
        step_fail(&spinner, "Failed to install dependencies");
        return Err(error);
    }

    spinner.set_message("Fetching core module files...");
    for file in &core.files {
        if let Err(error) =
            scaffold_file(client, &registry, &project_root, DEFAULT_SRC_DIR, file).await
        {
            step_fail(&spinner, "Failed to fetch core module files");
            return Err(error);
        }
    }

    create_initial_env(&project_root)?;

    step_succeed(
        &spinner,
        format!("Project initialized in {} using {}!", project_root.display(), pm),
    );
    Ok(())
}

/// Fetches the registry and looks up the core module in one go.
async fn fetch_core(client: &RegistryClient) -> Result<(ResolvedRegistry, RegistryModule)> {
    let registry = client.fetch_registry().await?;
    let core = find_module(&registry.manifest, CORE_MODULE)?.clone();
    Ok((registry, core))
}

async fn scaffold_file(
    client: &RegistryClient,
    registry: &ResolvedRegistry,
    project_root: &Path,
    src_dir: &str,
    file: &crate::registry::RegistryFile,
) -> Result<()> {
    let content = client.fetch_file(&registry.file_base_url, file).await?;
    write_module_file(project_root, src_dir, file, &content)?;
    Ok(())
}

#[derive(Serialize)]
struct StarterPackage {
    name: &'static str,
    version: &'static str,
    private: bool,
    scripts: StarterScripts,
}

#[derive(Serialize)]
struct StarterScripts {
    dev: &'static str,
}

/// The starter `package.json` for a fresh project.
///
/// The real project name lives in `zuro.json`; the manifest name stays the
/// generic template name.
const fn starter_package() -> StarterPackage {
    StarterPackage {
        name: "zuro-app",
        version: "0.0.1",
        private: true,
        scripts: StarterScripts { dev: "ts-node src/server.ts" },
    }
}
