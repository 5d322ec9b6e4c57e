//! Error handling for Zuro
//!
//! This module provides the error types and user-friendly error reporting for
//! the Zuro CLI. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! The error system consists of two main types:
//! - [`ZuroError`] - Enumerated error types for all failure cases in Zuro
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! Zuro errors are organized into several categories:
//! - **Registry protocol**: [`ZuroError::NetworkError`], [`ZuroError::RegistryStatus`],
//!   [`ZuroError::ProtocolError`], [`ZuroError::InvalidRegistryUrl`]
//! - **Integrity**: [`ZuroError::ChecksumMismatch`], [`ZuroError::SizeMismatch`]
//! - **Modules**: [`ZuroError::ModuleNotFound`]
//! - **Package managers**: [`ZuroError::PackageManagerNotFound`],
//!   [`ZuroError::PackageManagerError`]
//! - **Project safety**: [`ZuroError::PathEscapesProject`], [`ZuroError::ProjectNotManaged`]
//!
//! # Error Conversion and Context
//!
//! Common standard library errors are automatically converted:
//! - [`std::io::Error`] → [`ZuroError::IoError`]
//! - [`serde_json::Error`] → [`ZuroError::JsonError`]
//!
//! Use [`user_friendly_error`] to convert any error into a user-friendly format
//! with contextual suggestions.
//!
//! # Examples
//!
//! ```rust,no_run
//! use zuro_cli::core::{ZuroError, user_friendly_error};
//!
//! fn lookup() -> Result<(), ZuroError> {
//!     Err(ZuroError::ModuleNotFound {
//!         name: "athu".to_string(),
//!         similar: vec!["auth".to_string()],
//!     })
//! }
//!
//! if let Err(e) = lookup() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with a did-you-mean suggestion
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Zuro operations
///
/// Each variant represents a specific failure mode and carries the details
/// needed for a precise user-facing message. Variant choice also encodes the
/// retry policy: transport failures and 5xx statuses are the only retryable
/// kinds; protocol, integrity, and security errors always fail fast.
#[derive(Error, Debug)]
pub enum ZuroError {
    /// Transport-level network failure (timeout, DNS, connection reset)
    ///
    /// These are the transient failures the registry client retries with
    /// bounded backoff before surfacing.
    #[error("Network error: {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed (e.g. "fetch manifest")
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// Registry endpoint answered with a non-success HTTP status
    ///
    /// 5xx statuses are treated as transient and retried; 4xx statuses fail
    /// immediately since re-sending the same request cannot change the answer.
    #[error("Registry request failed with HTTP {status}: {url}")]
    RegistryStatus {
        /// The URL that was requested
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// Registry payload did not match the documented protocol
    ///
    /// Raised for JSON that is neither a manifest nor a channel pointer, and
    /// for a pointer that resolves to another pointer. Never retried: the
    /// payload is deterministic.
    #[error("Unexpected registry response from {url}: {reason}")]
    ProtocolError {
        /// The URL whose payload failed classification
        url: String,
        /// What was wrong with the payload
        reason: String,
    },

    /// The configured registry entry URL could not be parsed
    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidRegistryUrl {
        /// The offending URL string
        url: String,
        /// Parse failure detail
        reason: String,
    },

    /// Requested module does not exist in the fetched manifest
    #[error("Module '{name}' not found in registry")]
    ModuleNotFound {
        /// Name of the module that could not be found
        name: String,
        /// Close matches from the manifest, best first
        similar: Vec<String>,
    },

    /// Fetched content hash does not match the manifest digest
    ///
    /// Integrity failures are fatal and never retried: a deterministic
    /// mismatch cannot be fixed by asking again.
    #[error("Checksum mismatch for '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Registry path of the mismatched file
        name: String,
        /// The expected sha256 digest
        expected: String,
        /// The digest actually computed
        actual: String,
    },

    /// Fetched content length does not match the manifest size
    #[error("Size mismatch for '{name}': expected {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Registry path of the mismatched file
        name: String,
        /// The expected byte length
        expected: u64,
        /// The length actually received
        actual: u64,
    },

    /// Package manager binary not found on PATH
    ///
    /// Raised before any install attempt so a missing binary never leaves a
    /// half-installed module behind.
    #[error("Package manager '{name}' is not installed or not found in PATH")]
    PackageManagerNotFound {
        /// The binary that could not be located (npm, pnpm, yarn, bun)
        name: String,
    },

    /// Package manager invocation failed
    #[error("Package manager command failed: {operation}")]
    PackageManagerError {
        /// The command that failed (e.g. "pnpm add")
        operation: String,
        /// The error output from the process
        stderr: String,
    },

    /// A registry file target would resolve outside the project root
    ///
    /// This aborts the operation before any write happens.
    #[error("Refusing to write outside the project root: {target}")]
    PathEscapesProject {
        /// The offending target path from the registry manifest
        target: String,
    },

    /// The directory is an existing project not managed by Zuro
    #[error("This directory is not managed by Zuro (no zuro.json found)")]
    ProjectNotManaged,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for ZuroError {
    fn clone(&self) -> Self {
        match self {
            Self::NetworkError {
                operation,
                reason,
            } => Self::NetworkError {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::RegistryStatus {
                url,
                status,
            } => Self::RegistryStatus {
                url: url.clone(),
                status: *status,
            },
            Self::ProtocolError {
                url,
                reason,
            } => Self::ProtocolError {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::InvalidRegistryUrl {
                url,
                reason,
            } => Self::InvalidRegistryUrl {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::ModuleNotFound {
                name,
                similar,
            } => Self::ModuleNotFound {
                name: name.clone(),
                similar: similar.clone(),
            },
            Self::ChecksumMismatch {
                name,
                expected,
                actual,
            } => Self::ChecksumMismatch {
                name: name.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::SizeMismatch {
                name,
                expected,
                actual,
            } => Self::SizeMismatch {
                name: name.clone(),
                expected: *expected,
                actual: *actual,
            },
            Self::PackageManagerNotFound {
                name,
            } => Self::PackageManagerNotFound {
                name: name.clone(),
            },
            Self::PackageManagerError {
                operation,
                stderr,
            } => Self::PackageManagerError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::PathEscapesProject {
                target,
            } => Self::PathEscapesProject {
                target: target.clone(),
            },
            Self::ProjectNotManaged => Self::ProjectNotManaged,
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl ZuroError {
    /// Returns whether the registry client may retry after this error.
    ///
    /// Only transport failures and 5xx statuses qualify. Protocol, integrity,
    /// and 4xx errors are deterministic, so re-sending the request cannot
    /// change the outcome.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError { .. } => true,
            Self::RegistryStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`ZuroError`] and adds optional user-friendly
/// messages, suggestions for resolution, and additional details. This is the
/// primary way Zuro presents errors to CLI users.
///
/// # Display Format
///
/// When displayed, errors show:
/// 1. **Error**: the main error message in red
/// 2. **Details**: additional context in yellow (optional)
/// 3. **Suggestion**: actionable steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying Zuro error
    pub error: ZuroError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`ZuroError`]
    ///
    /// Use the builder methods [`with_suggestion`](Self::with_suggestion) and
    /// [`with_details`](Self::with_details) to add user-facing information.
    #[must_use]
    pub const fn new(error: ZuroError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps. They are displayed in green to
    /// draw attention.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details provide context about why the error occurred. They are
    /// displayed in yellow, less prominent than the error or suggestion.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// This function is the main entry point for converting arbitrary errors into
/// user-friendly messages for CLI display. It recognizes [`ZuroError`]
/// variants and common standard library errors, attaching tailored context;
/// everything else is rendered with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(zuro_error) = error.downcast_ref::<ZuroError>() {
        return create_error_context(zuro_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ZuroError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion(
                    "Check file ownership, or re-run with the permissions the project directory requires",
                )
                .with_details("Zuro does not have permission to read or write project files");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ZuroError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> = error
        .chain()
        .skip(1) // The root cause is already in to_string()
        .map(std::string::ToString::to_string)
        .collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ZuroError::Other {
        message,
    })
}

/// Create an [`ErrorContext`] with tailored suggestions for each [`ZuroError`]
fn create_error_context(error: ZuroError) -> ErrorContext {
    match &error {
        ZuroError::NetworkError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(
                "Check your internet connection. For local registry testing, point ZURO_REGISTRY_URL at a registry you control",
            )
            .with_details("The request was retried and still failed at the transport level"),

        ZuroError::RegistryStatus {
            status,
            ..
        } => {
            let context = if *status >= 500 {
                ErrorContext::new(error).with_details(
                    "The registry answered with a server error on every attempt; it may be mid-deploy",
                )
            } else {
                ErrorContext::new(error)
                    .with_details("Client errors are not retried; the same request would fail again")
            };
            context.with_suggestion(
                "Try again in a moment, or set ZURO_REGISTRY_URL to a different registry",
            )
        }

        ZuroError::ProtocolError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(
                "If you run your own registry, check that it serves a manifest or a channel pointer document",
            )
            .with_details("The payload was valid JSON but matched neither documented shape"),

        ZuroError::InvalidRegistryUrl {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Fix the ZURO_REGISTRY_URL value; it must be an absolute http(s) URL",
        ),

        ZuroError::ModuleNotFound {
            similar,
            ..
        } => {
            let context = ErrorContext::new(error.clone());
            if similar.is_empty() {
                context.with_suggestion("Check the module name against the registry documentation")
            } else {
                context.with_suggestion(format!("Did you mean: {}?", similar.join(", ")))
            }
        }

        ZuroError::ChecksumMismatch {
            ..
        }
        | ZuroError::SizeMismatch {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Try again later; if the mismatch persists, report it to the registry maintainers")
            .with_details(
                "The fetched content does not match the manifest digest. Nothing was written; integrity failures are never retried",
            ),

        ZuroError::PackageManagerNotFound {
            name,
        } => {
            let suggestion = match name.as_str() {
                "pnpm" => "Install pnpm: npm install -g pnpm (or corepack enable)",
                "yarn" => "Install yarn: npm install -g yarn (or corepack enable)",
                "bun" => "Install bun from https://bun.sh",
                _ => "Install Node.js (which bundles npm) from https://nodejs.org",
            };
            ErrorContext::new(error.clone())
                .with_suggestion(suggestion)
                .with_details("No packages were installed and no files were written")
        }

        ZuroError::PackageManagerError {
            operation,
            ..
        } => {
            let retry = format!("Inspect the output above, then run the failing command manually: {operation}");
            ErrorContext::new(error.clone()).with_suggestion(retry)
        }

        ZuroError::PathEscapesProject {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Report this module to the registry maintainers")
            .with_details(
                "The module manifest names a target outside your project. The operation aborted before writing anything",
            ),

        ZuroError::ProjectNotManaged => ErrorContext::new(error)
            .with_details(
                "This looks like an existing project that wasn't created with Zuro, so it was left untouched. \
                 Zuro works in a fresh directory, or in a project it already manages",
            )
            .with_suggestion("Run 'zuro init' to adopt this project first"),

        _ => ErrorContext::new(error),
    }
}
