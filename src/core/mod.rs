//! Core types and functionality for Zuro
//!
//! This module forms the foundation of Zuro's type system, providing the error
//! handling abstractions used throughout the codebase.
//!
//! # Error Management
//!
//! Zuro uses an error handling system designed for both developer ergonomics
//! and end-user experience:
//! - **Strongly-typed errors** ([`ZuroError`]) for precise handling in code
//! - **User-friendly contexts** ([`ErrorContext`]) with actionable suggestions
//! - **Automatic conversion** from common standard library errors
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use zuro_cli::core::{ZuroError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<String> {
//!     Err(ZuroError::ProjectNotManaged.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     friendly.display(); // Shows colored error with suggestions
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, ZuroError, user_friendly_error};
