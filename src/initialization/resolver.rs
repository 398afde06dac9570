//! DNS resolver initialization.
//!
//! This module builds the resolver used for best-effort reverse DNS on IP
//! lookups.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::error_handling::InitializationError;
use hickory_resolver::TokioAsyncResolver;

/// Initializes the DNS resolver for PTR lookups.
///
/// Uses the system configuration (`/etc/resolv.conf`) when it can be read and
/// falls back to the resolver's default upstreams otherwise. Timeouts are kept
/// short: a slow PTR answer only costs the `hostname` field.
///
/// # Returns
///
/// A configured `TokioAsyncResolver` wrapped in `Arc` for sharing across tasks.
///
/// # Errors
///
/// Returns `InitializationError::DnsResolverError` if no configuration can be
/// built. The fallback path makes this rare in practice.
pub fn init_resolver() -> Result<Arc<TokioAsyncResolver>, InitializationError> {
    use hickory_resolver::config::{ResolverConfig, ResolverOpts};

    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            log::debug!("Falling back to default DNS configuration: {e}");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };

    if config.name_servers().is_empty() {
        return Err(InitializationError::DnsResolverError(
            "no name servers configured".to_string(),
        ));
    }

    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // PTR names are absolute; never append search domains
    opts.ndots = 0;

    Ok(Arc::new(TokioAsyncResolver::tokio(config, opts)))
}
