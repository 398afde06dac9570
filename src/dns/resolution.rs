//! Reverse DNS lookup.
//!
//! This module resolves PTR records for the `hostname` field of IP results.

use std::net::IpAddr;

use hickory_resolver::TokioAsyncResolver;

/// Performs a reverse DNS lookup (PTR record) for an IP address.
///
/// Best effort: any resolver error (NXDOMAIN, timeout, SERVFAIL) is logged at
/// debug level and yields `None`.
///
/// # Arguments
///
/// * `ip` - The IP address to look up
/// * `resolver` - The DNS resolver instance
///
/// # Returns
///
/// The first PTR name without its trailing dot, or `None`.
pub async fn reverse_dns_lookup(ip: IpAddr, resolver: &TokioAsyncResolver) -> Option<String> {
    match resolver.reverse_lookup(ip).await {
        Ok(response) => response
            .iter()
            .next()
            .map(|name| normalize_ptr_name(&name.to_utf8()))
            .filter(|name| !name.is_empty()),
        Err(e) => {
            log::debug!("Reverse DNS lookup for {ip} failed: {e}");
            None
        }
    }
}

/// Strips the root label from a fully qualified name.
pub(crate) fn normalize_ptr_name(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
