//! # Error Handling
//!
//! This module defines the centralized error type for the installer. It uses
//! the `thiserror` library to describe every failure class the install can
//! run into, each carrying enough context to produce a useful message.
//!
//! ## Failure Classes
//!
//! - **Preconditions**: a required tool or the game installation is missing.
//!   Reported before anything on disk is touched.
//! - **Manifest reading**: the XML manifest is unreadable or malformed, or a
//!   path expression cannot be evaluated.
//! - **Manifest integrity**: a task is internally inconsistent (for example
//!   mismatched source and target lists).
//! - **Repository sync**: a `git clone` or `git fetch` failed. There is no
//!   offline fallback.
//! - **External tools**: the assembly injector or an external merge program
//!   exited unsuccessfully.
//! - **Merge**: the built-in JSON merge could not combine two documents.
//! - **Filesystem**: copy, remove or symlink operations failed.
//!
//! An unsupported job type in the manifest is deliberately not an error: the
//! interpreter logs a warning and moves on.

use thiserror::Error;

/// Main error type for installer operations
#[derive(Error, Debug)]
pub enum Error {
    /// A prerequisite for the install is missing.
    ///
    /// Includes an optional hint pointing the user at how to fix it.
    #[error("Precondition failed: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Precondition {
        message: String,
        /// Optional hint for how to satisfy the precondition
        hint: Option<String>,
    },

    /// The manifest document could not be read or parsed.
    #[error("Failed to read manifest {path}: {message}")]
    ManifestRead { path: String, message: String },

    /// A path expression was malformed.
    #[error("Invalid manifest query '{expression}': {message}")]
    ManifestQuery { expression: String, message: String },

    /// A task's declared parameters contradict each other.
    #[error("Manifest integrity error in task {task}: {message}")]
    ManifestIntegrity { task: String, message: String },

    /// A git command against a repository cache failed.
    #[error("Repository sync failed for {url}: {command} - {message}")]
    RepositorySync {
        url: String,
        command: String,
        message: String,
    },

    /// An external program exited unsuccessfully or could not be started.
    #[error("External tool error: {tool} - {message}")]
    ExternalTool { tool: String, message: String },

    /// An error occurred while merging JSON documents.
    #[error("Merge operation error: {operation} - {message}")]
    Merge { operation: String, message: String },

    /// A filesystem operation failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// One or more tasks failed while the run was configured to continue.
    #[error("{} task(s) failed: {}", failed.len(), failed.join(", "))]
    TasksFailed { failed: Vec<String> },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
