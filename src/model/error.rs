//! Error taxonomy for the packdex engine.
//!
//! One `thiserror` enum per concern, composed into a top-level [`AppError`]
//! via `#[from]` conversions so call sites propagate with `?`.
//!
//! Recovery policy:
//! - Parse rejections ([`crate::parser::ParseRejection`]) are non-fatal and
//!   never surface here: the parser rejects a message, the ingest pipeline
//!   counts and skips it.
//! - [`SyncError::Busy`] is a reportable conflict, not a crash. Existing
//!   cache state is left untouched.
//! - [`StoreError::NotFound`] is a reported outcome of delete-by-id.
//! - Input and config errors are fatal at startup.

use crate::model::PackId;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error wrapping all domain-specific failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read the raw message batch from file or stdin.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing subscriber setup failed.
    #[error("Logging setup failed: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Cache synchronization was rejected.
    #[error("Synchronization failed: {0}")]
    Sync(#[from] SyncError),

    /// A cache store operation reported a failure outcome.
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Failed to serialize query results for output.
    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors encountered when reading the raw message batch.
#[derive(Debug, Error)]
pub enum InputError {
    /// The specified message file does not exist.
    #[error("Message file not found: {path:?}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// No file argument was given and stdin is a terminal.
    #[error("No input: provide a message file or pipe one to stdin")]
    NoInput,

    /// Generic I/O failure (permissions, disk errors).
    #[error("I/O error reading input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from cache synchronization requests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// A synchronization is already running. The request is rejected, not
    /// queued: interleaved merges would corrupt the dedup invariants.
    #[error("a synchronization is already in progress")]
    Busy,
}

/// Reported failure outcomes of cache store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Delete-by-id did not find the pack. Cache state is unchanged.
    #[error("pack {0} not found in cache")]
    NotFound(PackId),
}
