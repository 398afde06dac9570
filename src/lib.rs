//! ipinfo library: IP and AS number lookups over MaxMind GeoLite2 databases
//!
//! This library keeps a city-level and an AS-number GeoLite2 database open,
//! indexes the AS database by AS number, refreshes both from the MaxMind
//! update service in the background, and answers queries through a
//! short-lived result cache.
//!
//! # Example
//!
//! ```no_run
//! use ipinfo::{Config, GeoIpManager, LookupService};
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let manager = GeoIpManager::open(config.clone()).await?;
//! let lookups = LookupService::new(manager.store(), None, config.cache_ttl);
//!
//! let cancel = CancellationToken::new();
//! let refresh = manager.start_background_refresh(cancel, Duration::from_secs(24 * 60 * 60))?;
//!
//! if let Some(record) = lookups.lookup_ip("8.8.8.8".parse()?).await {
//!     println!("{:?}", record.org);
//! }
//! let google = lookups.lookup_asn(15169)?;
//! println!("{} announces {} IPv4 prefixes", google.name, google.prefixes.ipv4.len());
//!
//! refresh.shutdown().await?;
//! manager.close();
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod app;
mod cache;
pub mod config;
mod dns;
mod error_handling;
pub mod geoip;
pub mod initialization;
mod lookup;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use app::shutdown_gracefully;
pub use cache::ResultCache;
pub use config::{Config, Credentials, LogFormat, LogLevel};
pub use error_handling::{DatabaseError, DownloadError, InitializationError, LookupError};
pub use geoip::{
    DatabaseStore, GenerationInfo, GeoIpManager, RefreshReport, RefreshTask, Updater,
};
pub use lookup::{parse_asn, AsnPrefixes, AsnResponse, GeoRecord, LookupService};
