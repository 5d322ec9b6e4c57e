//! Canned project trees and module file templates
//!
//! The template constants mirror the files the hosted registry serves for
//! each module, so fixture registries scaffold realistic content and the
//! entrypoint wiring code paths run against the same anchors the real
//! templates carry. [`ProjectFixture`] lays complete project states on
//! disk: a bare npm package, a freshly initialized project, or one with
//! feature modules already present.

use std::path::Path;

use crate::pm::PackageManager;
use crate::project::ProjectConfig;

/// The core module's `app.ts`, carrying all three wiring anchors.
pub const APP_TS: &str = r#"import express from "express";
import cors from "cors";
import helmet from "helmet";
import rootRouter from "./routes";

const app = express();

app.use(helmet());
app.use(cors());
app.use(express.json());
app.use("/api", rootRouter);

app.get("/health", (_req, res) => {
    res.json({ status: "ok", timestamp: new Date().toISOString() });
});

export default app;
"#;

/// The core module's `server.ts`.
pub const SERVER_TS: &str = r#"import app from "./app";
import { env } from "./env";

app.listen(env.PORT, () => {
    console.log(`API listening on port ${env.PORT}`);
});
"#;

/// The core module's `env.ts`, shaped for schema field insertion.
pub const ENV_TS: &str = r#"import "dotenv/config";
import { z } from "zod";

const schema = z.object({
    PORT: z.coerce.number().default(3000),
    NODE_ENV: z.string().default("development"),
});

export const env = schema.parse(process.env);
"#;

/// The core module's root router.
pub const ROUTES_INDEX_TS: &str = r#"import { Router } from "express";

const rootRouter = Router();

export default rootRouter;
"#;

/// The auth module's better-auth setup, its signature file.
pub const AUTH_TS: &str = r#"import { betterAuth } from "better-auth";
import { drizzleAdapter } from "better-auth/adapters/drizzle";
import { db } from "../db";

export const auth = betterAuth({
    database: drizzleAdapter(db, { provider: "pg" }),
    emailAndPassword: { enabled: true },
});
"#;

/// The auth module's OpenAPI path registrations.
pub const OPENAPI_AUTH_TS: &str = r#"import type { OpenAPIRegistry } from "@asteasolutions/zod-to-openapi";

export function registerAuthPaths(registry: OpenAPIRegistry) {
    registry.registerPath({
        method: "post",
        path: "/api/auth/sign-in/email",
        responses: { 200: { description: "Signed in" } },
    });
}
"#;

/// The docs module's `lib/openapi.ts`, carrying the registration markers.
pub const OPENAPI_TS: &str = r#"import { OpenAPIRegistry, OpenApiGeneratorV3 } from "@asteasolutions/zod-to-openapi";

const registry = new OpenAPIRegistry();

// ZURO_DOCS_MODULES_START
// Module documentation registrations are inserted below.
// ZURO_DOCS_MODULES_END

export function createOpenApiDocument() {
    const generator = new OpenApiGeneratorV3(registry.definitions);
    return generator.generateDocument({
        openapi: "3.0.0",
        info: { title: "API Reference", version: "1.0.0" },
    });
}
"#;

/// The docs module's router, its signature file.
pub const DOCS_ROUTES_TS: &str = r#"import { Router } from "express";
import { createOpenApiDocument } from "../lib/openapi";

const docsRouter = Router();

docsRouter.get("/openapi.json", (_req, res) => {
    res.json(createOpenApiDocument());
});

export default docsRouter;
"#;

/// The error-handler module's typed errors, its signature file.
pub const ERRORS_TS: &str = r#"export class HttpError extends Error {
    constructor(
        public readonly status: number,
        message: string,
    ) {
        super(message);
        this.name = "HttpError";
    }
}

export class NotFoundError extends HttpError {
    constructor(resource: string) {
        super(404, `${resource} not found`);
    }
}
"#;

/// The error-handler module's terminal middleware.
pub const ERROR_HANDLER_TS: &str = r#"import type { NextFunction, Request, Response } from "express";
import { HttpError } from "../lib/errors";

export function errorHandler(err: Error, _req: Request, res: Response, _next: NextFunction) {
    if (err instanceof HttpError) {
        res.status(err.status).json({ error: err.message });
        return;
    }
    console.error(err);
    res.status(500).json({ error: "Internal Server Error" });
}
"#;

/// The PostgreSQL dialect's Drizzle entrypoint.
pub const DB_INDEX_PG_TS: &str = r#"import { drizzle } from "drizzle-orm/node-postgres";
import { Pool } from "pg";
import { env } from "../env";

const pool = new Pool({ connectionString: env.DATABASE_URL });

export const db = drizzle(pool);
"#;

/// The PostgreSQL dialect's starter schema.
pub const DB_SCHEMA_PG_TS: &str = r#"import { pgTable, serial, text, timestamp } from "drizzle-orm/pg-core";

export const users = pgTable("users", {
    id: serial("id").primaryKey(),
    email: text("email").notNull().unique(),
    createdAt: timestamp("created_at").defaultNow(),
});
"#;

/// The PostgreSQL dialect's drizzle-kit configuration.
pub const DRIZZLE_CONFIG_PG_TS: &str = r#"import { defineConfig } from "drizzle-kit";

export default defineConfig({
    schema: "./src/db/schema.ts",
    out: "./drizzle",
    dialect: "postgresql",
    dbCredentials: { url: process.env.DATABASE_URL! },
});
"#;

/// The MySQL dialect's Drizzle entrypoint.
pub const DB_INDEX_MYSQL_TS: &str = r#"import { drizzle } from "drizzle-orm/mysql2";
import mysql from "mysql2/promise";
import { env } from "../env";

const pool = mysql.createPool(env.DATABASE_URL);

export const db = drizzle(pool);
"#;

/// The MySQL dialect's starter schema.
pub const DB_SCHEMA_MYSQL_TS: &str = r#"import { int, mysqlTable, timestamp, varchar } from "drizzle-orm/mysql-core";

export const users = mysqlTable("users", {
    id: int("id").autoincrement().primaryKey(),
    email: varchar("email", { length: 255 }).notNull().unique(),
    createdAt: timestamp("created_at").defaultNow(),
});
"#;

/// The MySQL dialect's drizzle-kit configuration.
pub const DRIZZLE_CONFIG_MYSQL_TS: &str = r#"import { defineConfig } from "drizzle-kit";

export default defineConfig({
    schema: "./src/db/schema.ts",
    out: "./drizzle",
    dialect: "mysql",
    dbCredentials: { url: process.env.DATABASE_URL! },
});
"#;

/// Starter `package.json` matching what a fresh `init` writes.
pub const PACKAGE_JSON: &str = r#"{
    "name": "fixture-api",
    "version": "0.0.1",
    "private": true,
    "scripts": {
        "dev": "ts-node src/server.ts"
    }
}
"#;

/// A hand-written `package.json` from a project Zuro did not create.
pub const LEGACY_PACKAGE_JSON: &str = r#"{
    "name": "legacy-api",
    "version": "1.4.2",
    "dependencies": {
        "express": "^4.19.0"
    }
}
"#;

/// A project tree written under a test directory.
///
/// Constructors produce common states; [`ProjectFixture::file`] adds or
/// replaces individual entries on top. The state helpers assume the
/// default `src` source directory; tests with a custom layout compose
/// their tree from `file` calls.
pub struct ProjectFixture {
    files: Vec<(String, String)>,
}

impl ProjectFixture {
    /// An empty tree.
    #[must_use]
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// A directory holding only a hand-written `package.json`, as `init`
    /// finds when adopting an existing project.
    #[must_use]
    pub fn bare_node_project() -> Self {
        Self::empty().file("package.json", LEGACY_PACKAGE_JSON)
    }

    /// A project as a fresh `init` leaves it: config, starter package
    /// manifest, the core module files and a seeded `.env`.
    #[must_use]
    pub fn initialized() -> Self {
        Self::initialized_with(PackageManager::Npm, "src")
    }

    /// Same as [`ProjectFixture::initialized`] with an explicit package
    /// manager and source directory.
    #[must_use]
    pub fn initialized_with(pm: PackageManager, src_dir: &str) -> Self {
        Self::empty()
            .file("zuro.json", &config_content(pm, src_dir))
            .file("package.json", PACKAGE_JSON)
            .file(&format!("{src_dir}/app.ts"), APP_TS)
            .file(&format!("{src_dir}/server.ts"), SERVER_TS)
            .file(&format!("{src_dir}/env.ts"), ENV_TS)
            .file(&format!("{src_dir}/routes/index.ts"), ROUTES_INDEX_TS)
            .file(".env", "PORT=3000\n")
    }

    /// Adds the docs module's files, unwired.
    #[must_use]
    pub fn with_docs(self) -> Self {
        self.file("src/lib/openapi.ts", OPENAPI_TS)
            .file("src/routes/docs.routes.ts", DOCS_ROUTES_TS)
    }

    /// Adds the auth module's files, unwired.
    #[must_use]
    pub fn with_auth(self) -> Self {
        self.file("src/lib/auth.ts", AUTH_TS).file("src/lib/openapi.auth.ts", OPENAPI_AUTH_TS)
    }

    /// Adds the PostgreSQL database files and a `.env` carrying its
    /// connection string.
    #[must_use]
    pub fn with_postgres(self) -> Self {
        self.file("src/db/index.ts", DB_INDEX_PG_TS)
            .file("src/db/schema.ts", DB_SCHEMA_PG_TS)
            .file("drizzle.config.ts", DRIZZLE_CONFIG_PG_TS)
            .file(".env", "PORT=3000\nDATABASE_URL=postgresql://postgres@localhost:5432/mydb\n")
    }

    /// Adds or replaces a single file.
    #[must_use]
    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.files.retain(|(existing, _)| existing != relative);
        self.files.push((relative.to_string(), content.to_string()));
        self
    }

    /// Writes every file under `root`, creating parent directories.
    ///
    /// # Panics
    ///
    /// Panics on any filesystem failure.
    pub fn write_to(&self, root: &Path) {
        for (relative, content) in &self.files {
            let path = root.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).expect("create fixture directories");
            }
            std::fs::write(&path, content).expect("write fixture file");
        }
    }
}

fn config_content(pm: PackageManager, src_dir: &str) -> String {
    let config = ProjectConfig {
        name: Some("fixture-api".to_string()),
        pm: Some(pm),
        src_dir: Some(src_dir.to_string()),
    };
    let mut content = serde_json::to_string_pretty(&config).expect("serialize fixture config");
    content.push('\n');
    content
}
