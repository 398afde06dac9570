//! Error type definitions.
//!
//! This module defines the error types returned at each component boundary.
//! Lookups only ever surface [`LookupError`]; download and decode details stay
//! inside the database manager.

use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::StatusCode;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client used for database updates.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    /// Error initializing the DNS resolver.
    #[error("DNS resolver initialization error: {0}")]
    DnsResolverError(String),
}

/// Error types for database lifecycle operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Update credentials are missing.
    ///
    /// Only fatal when no usable local database exists; otherwise the service
    /// keeps serving the databases it already has.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A database file is missing or could not be parsed.
    #[error("Failed to open database {path:?}: {reason}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Reader error text.
        reason: String,
    },

    /// A committed download could not be moved over its target path.
    #[error("Failed to replace database {path:?}: {source}")]
    Commit {
        /// Target path of the rename.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The database store was closed; no generation is being served.
    #[error("Database store is closed")]
    Closed,

    /// A blocking task (open, index build) panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Error types for fetching a single database edition.
///
/// Every variant carries the edition id so log lines and reports stay
/// attributable.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Download of {edition} failed: {source}")]
    Request {
        /// Edition id.
        edition: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// The update server answered with an unexpected status code.
    #[error("Download of {edition} failed: received {status} - {body}")]
    Status {
        /// Edition id.
        edition: String,
        /// Status code returned by the server.
        status: StatusCode,
        /// Truncated response body.
        body: String,
    },

    /// Local file handling (hashing, temp file, decompression) failed.
    #[error("Download of {edition} failed: {context}: {source}")]
    Io {
        /// Edition id.
        edition: String,
        /// What was being done when the error happened.
        context: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Edition the failed download was for.
    pub fn edition(&self) -> &str {
        match self {
            DownloadError::Request { edition, .. }
            | DownloadError::Status { edition, .. }
            | DownloadError::Io { edition, .. } => edition,
        }
    }
}

/// Outcomes of a lookup that carry no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The AS number is valid but has no prefixes in the current dataset.
    #[error("no prefixes found for AS{0} in the database")]
    NotFound(u32),

    /// The AS number text could not be parsed or is zero.
    #[error("invalid ASN {0:?}: must be a positive number")]
    InvalidAsn(String),
}
