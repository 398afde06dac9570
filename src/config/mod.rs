//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (editions, timeouts, cache lifetime, etc.)
//! - The library [`Config`] and update [`Credentials`]
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{edition_path, Command, Config, Credentials, LogFormat, LogLevel, Opt};
