//! Error handling.
//!
//! This module provides the error types used across the crate:
//! - **Initialization** errors for logger, HTTP client and resolver setup
//! - **Database** errors for opening, downloading and committing databases
//! - **Lookup** outcomes that carry no value (unknown or invalid AS numbers)

mod types;

// Re-export public API
pub use types::{DatabaseError, DownloadError, InitializationError, LookupError};
