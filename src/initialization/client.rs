//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use crate::config::USER_AGENT;
use reqwest::ClientBuilder;

/// Initializes the HTTP client used to download database editions.
///
/// Creates a `reqwest::Client` configured with:
/// - the crate User-Agent
/// - a per-request `timeout` covering the whole download
/// - transparent gzip decoding disabled (the update origin serves `.gz`
///   payloads that are decompressed while writing to disk)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_update_client(timeout: Duration) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .no_gzip()
        .build()?;
    Ok(Arc::new(client))
}
