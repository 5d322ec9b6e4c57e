//! In-process HTTP registry fixtures
//!
//! Integration tests need a registry endpoint that behaves like the hosted
//! one: a channel pointer resolving to a versioned manifest, module files
//! served relative to that manifest, and controllable failure modes for
//! retry and integrity coverage. [`RegistryFixture`] binds a Tokio listener
//! on an ephemeral loopback port and answers registered routes with minimal
//! HTTP/1.1 responses, so tests stay fully offline.
//!
//! [`RegistryBuilder`] assembles the wire documents from [`ModuleFixture`]
//! definitions and installs them on a fixture server in one call.
//! [`standard_registry`] provides the module set most flow tests want.

use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::fixtures;

/// Version segment used for the builder's manifest routes.
const MANIFEST_VERSION: &str = "v1.2.0";

/// Hex-encoded SHA-256 of a string, as recorded in manifest file entries.
#[must_use]
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

struct Route {
    status: u16,
    body: Vec<u8>,
    location: Option<String>,
    fail_first: usize,
}

#[derive(Default)]
struct FixtureState {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
}

/// A loopback HTTP server with programmable routes and per-path hit
/// counting.
///
/// Unregistered paths answer 404. The accept loop is aborted when the
/// fixture is dropped.
pub struct RegistryFixture {
    address: SocketAddr,
    state: Arc<Mutex<FixtureState>>,
    server_task: JoinHandle<()>,
}

impl RegistryFixture {
    /// Binds an ephemeral loopback port and starts serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fixture listener");
        let address = listener.local_addr().expect("fixture listener address");
        let state = Arc::new(Mutex::new(FixtureState::default()));

        let accept_state = Arc::clone(&state);
        let server_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let connection_state = Arc::clone(&accept_state);
                tokio::spawn(async move {
                    let _ = serve_connection(stream, &connection_state).await;
                });
            }
        });

        Self { address, state, server_task }
    }

    /// Absolute URL for a path on this fixture.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.address, path)
    }

    /// Registers a 200 route serving raw bytes.
    pub async fn route(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.insert(path, Route { status: 200, body: body.into(), location: None, fail_first: 0 })
            .await;
    }

    /// Registers a 200 route serving a JSON document.
    pub async fn route_json(&self, path: &str, document: &Value) {
        self.route(path, serde_json::to_vec(document).expect("serialize fixture document")).await;
    }

    /// Registers a route answering with a fixed status code.
    pub async fn route_with_status(&self, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.insert(path, Route { status, body: body.into(), location: None, fail_first: 0 })
            .await;
    }

    /// Registers a 302 redirect to an absolute URL.
    pub async fn redirect(&self, path: &str, location: &str) {
        let route = Route {
            status: 302,
            body: Vec::new(),
            location: Some(location.to_string()),
            fail_first: 0,
        };
        self.insert(path, route).await;
    }

    /// Makes an existing route answer its first `failures` requests with a
    /// 500 before serving normally.
    ///
    /// # Panics
    ///
    /// Panics if no route is registered for `path`.
    pub async fn fail_first(&self, path: &str, failures: usize) {
        let mut state = self.state.lock().await;
        state
            .routes
            .get_mut(path)
            .expect("fail_first requires a registered route")
            .fail_first = failures;
    }

    /// Number of requests this fixture has seen for `path`.
    pub async fn hits(&self, path: &str) -> usize {
        self.state.lock().await.hits.get(path).copied().unwrap_or(0)
    }

    async fn insert(&self, path: &str, route: Route) {
        self.state.lock().await.routes.insert(path.to_string(), route);
    }
}

impl Drop for RegistryFixture {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    state: &Mutex<FixtureState>,
) -> std::io::Result<()> {
    let mut head = Vec::new();
    let mut buffer = [0_u8; 4096];
    loop {
        let read = stream.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        head.extend_from_slice(&buffer[..read]);
        if head.windows(4).any(|window| window == b"\r\n\r\n") || head.len() > 64 * 1024 {
            break;
        }
    }

    let request_line = String::from_utf8_lossy(&head);
    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();

    let response = {
        let mut state = state.lock().await;
        respond(&mut state, &path)
    };
    stream.write_all(&response).await?;
    stream.shutdown().await
}

fn respond(state: &mut FixtureState, path: &str) -> Vec<u8> {
    let seen = state.hits.entry(path.to_string()).or_insert(0);
    *seen += 1;
    let seen = *seen;

    let Some(route) = state.routes.get(path) else {
        return encode_response(404, b"not found", None);
    };
    if seen <= route.fail_first {
        return encode_response(500, b"synthetic failure", None);
    }
    encode_response(route.status, &route.body, route.location.as_deref())
}

fn encode_response(status: u16, body: &[u8], location: Option<&str>) -> Vec<u8> {
    let reason = match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unspecified",
    };

    let mut head = format!("HTTP/1.1 {status} {reason}\r\n");
    if let Some(location) = location {
        head.push_str(&format!("Location: {location}\r\n"));
    }
    head.push_str(&format!(
        "Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    ));

    let mut response = head.into_bytes();
    response.extend_from_slice(body);
    response
}

/// A module definition the builder turns into a manifest entry plus file
/// routes.
#[derive(Clone)]
pub struct ModuleFixture {
    name: String,
    module_type: Option<&'static str>,
    description: Option<&'static str>,
    files: Vec<FileFixture>,
    dependencies: Vec<String>,
    dev_dependencies: Vec<String>,
    module_dependencies: Vec<String>,
}

#[derive(Clone)]
struct FileFixture {
    path: String,
    target: String,
    content: String,
    sha256: Option<String>,
    size: Option<u64>,
}

impl ModuleFixture {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            module_type: None,
            description: None,
            files: Vec::new(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            module_dependencies: Vec::new(),
        }
    }

    /// Sets the manifest `type` field.
    #[must_use]
    pub fn module_type(mut self, module_type: &'static str) -> Self {
        self.module_type = Some(module_type);
        self
    }

    /// Sets the manifest `description` field.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Adds a file whose integrity metadata is computed from the content.
    #[must_use]
    pub fn file(mut self, path: &str, target: &str, content: &str) -> Self {
        self.files.push(FileFixture {
            path: path.to_string(),
            target: target.to_string(),
            content: content.to_string(),
            sha256: None,
            size: None,
        });
        self
    }

    /// Adds a file whose manifest entry records the given integrity values
    /// instead of ones computed from the content, for corruption tests.
    #[must_use]
    pub fn file_with_integrity(
        mut self,
        path: &str,
        target: &str,
        content: &str,
        sha256: &str,
        size: u64,
    ) -> Self {
        self.files.push(FileFixture {
            path: path.to_string(),
            target: target.to_string(),
            content: content.to_string(),
            sha256: Some(sha256.to_string()),
            size: Some(size),
        });
        self
    }

    /// Adds a runtime npm dependency.
    #[must_use]
    pub fn dependency(mut self, name: &str) -> Self {
        self.dependencies.push(name.to_string());
        self
    }

    /// Adds a dev npm dependency.
    #[must_use]
    pub fn dev_dependency(mut self, name: &str) -> Self {
        self.dev_dependencies.push(name.to_string());
        self
    }

    /// Declares a module dependency installed before this module.
    #[must_use]
    pub fn requires(mut self, module: &str) -> Self {
        self.module_dependencies.push(module.to_string());
        self
    }
}

/// URLs of a registry installed on a fixture server.
pub struct InstalledRegistry {
    /// Channel pointer URL, the canonical entry point.
    pub entry_url: String,
    /// Versioned manifest URL, for tests that skip the pointer hop.
    pub manifest_url: String,
    /// Base URL without a document path, for entry resolution tests.
    pub base_url: String,
}

/// Assembles pointer, manifest and file routes on a [`RegistryFixture`].
#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<ModuleFixture>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn module(mut self, module: ModuleFixture) -> Self {
        self.modules.push(module);
        self
    }

    /// Registers every module file, the versioned manifest and the stable
    /// channel pointer on the server.
    ///
    /// The pointer references the manifest through a relative `indexPath`,
    /// matching the hosted registry layout, so resolving it also exercises
    /// relative URL joining.
    pub async fn install(self, server: &RegistryFixture) -> InstalledRegistry {
        let manifest_prefix = format!("/registry/{MANIFEST_VERSION}");

        let mut modules = Map::new();
        for module in &self.modules {
            let mut files = Vec::new();
            for file in &module.files {
                server
                    .route(&format!("{manifest_prefix}/{}", file.path), file.content.as_bytes().to_vec())
                    .await;

                let sha256 = file.sha256.clone().unwrap_or_else(|| sha256_hex(&file.content));
                let size = file.size.unwrap_or(file.content.len() as u64);
                files.push(json!({
                    "path": file.path,
                    "target": file.target,
                    "sha256": sha256,
                    "size": size,
                }));
            }

            let mut entry = json!({
                "files": files,
                "moduleDependencies": module.module_dependencies,
                "dependencies": module.dependencies,
                "devDependencies": module.dev_dependencies,
            });
            if let Some(module_type) = module.module_type {
                entry["type"] = json!(module_type);
            }
            if let Some(description) = module.description {
                entry["description"] = json!(description);
            }
            modules.insert(module.name.clone(), entry);
        }

        let manifest = json!({
            "schemaVersion": 1,
            "templateVersion": MANIFEST_VERSION.trim_start_matches('v'),
            "modules": Value::Object(modules),
        });
        server.route_json(&format!("{manifest_prefix}/index.json"), &manifest).await;

        let pointer = json!({
            "schemaVersion": 1,
            "channel": "stable",
            "indexPath": format!("../{MANIFEST_VERSION}/index.json"),
        });
        server.route_json("/registry/channels/stable.json", &pointer).await;

        InstalledRegistry {
            entry_url: server.url("/registry/channels/stable.json"),
            manifest_url: server.url(&format!("{manifest_prefix}/index.json")),
            base_url: server.url("/registry"),
        }
    }
}

/// The module set most flow tests install from.
///
/// None of the modules declare npm dependencies, so flows that install them
/// never shell out to a package manager and stay runnable on machines
/// without one on `PATH`. Module files are the real templates from
/// [`fixtures`], which keeps the wiring anchors live.
#[must_use]
pub fn standard_registry() -> RegistryBuilder {
    RegistryBuilder::new()
        .module(
            ModuleFixture::new("core")
                .module_type("base")
                .description("Express app skeleton with validated configuration")
                .file("express/app.ts", "app.ts", fixtures::APP_TS)
                .file("express/server.ts", "server.ts", fixtures::SERVER_TS)
                .file("express/env.ts", "env.ts", fixtures::ENV_TS)
                .file("express/routes/index.ts", "routes/index.ts", fixtures::ROUTES_INDEX_TS),
        )
        .module(
            ModuleFixture::new("auth")
                .module_type("feature")
                .description("Email and password authentication via better-auth")
                .requires("database")
                .file("auth/lib/auth.ts", "lib/auth.ts", fixtures::AUTH_TS)
                .file("auth/lib/openapi.auth.ts", "lib/openapi.auth.ts", fixtures::OPENAPI_AUTH_TS),
        )
        .module(
            ModuleFixture::new("docs")
                .module_type("feature")
                .description("OpenAPI document generation and docs routes")
                .file("docs/lib/openapi.ts", "lib/openapi.ts", fixtures::OPENAPI_TS)
                .file("docs/routes/docs.routes.ts", "routes/docs.routes.ts", fixtures::DOCS_ROUTES_TS),
        )
        .module(
            ModuleFixture::new("error-handler")
                .module_type("feature")
                .description("Typed HTTP errors and the terminal error middleware")
                .file("error-handler/lib/errors.ts", "lib/errors.ts", fixtures::ERRORS_TS)
                .file(
                    "error-handler/middleware/error-handler.ts",
                    "middleware/error-handler.ts",
                    fixtures::ERROR_HANDLER_TS,
                ),
        )
        .module(
            ModuleFixture::new("database-pg")
                .module_type("database")
                .description("Drizzle ORM wired to PostgreSQL")
                .file("database-pg/db/index.ts", "db/index.ts", fixtures::DB_INDEX_PG_TS)
                .file("database-pg/db/schema.ts", "db/schema.ts", fixtures::DB_SCHEMA_PG_TS)
                .file(
                    "database-pg/drizzle.config.ts",
                    "../drizzle.config.ts",
                    fixtures::DRIZZLE_CONFIG_PG_TS,
                ),
        )
        .module(
            ModuleFixture::new("database-mysql")
                .module_type("database")
                .description("Drizzle ORM wired to MySQL")
                .file("database-mysql/db/index.ts", "db/index.ts", fixtures::DB_INDEX_MYSQL_TS)
                .file("database-mysql/db/schema.ts", "db/schema.ts", fixtures::DB_SCHEMA_MYSQL_TS)
                .file(
                    "database-mysql/drizzle.config.ts",
                    "../drizzle.config.ts",
                    fixtures::DRIZZLE_CONFIG_MYSQL_TS,
                ),
        )
}
