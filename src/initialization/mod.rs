//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - HTTP client for database downloads
//! - DNS resolver for reverse lookups
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;
mod resolver;

// Re-export public API
pub use client::init_update_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;
