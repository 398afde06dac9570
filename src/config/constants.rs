//! Configuration constants.
//!
//! This module defines the defaults used throughout the crate: edition ids,
//! file naming, update origin, timeouts and cache lifetimes.

use std::time::Duration;

// Editions
/// City-level geolocation edition
pub const CITY_EDITION: &str = "GeoLite2-City";
/// AS-number edition
pub const ASN_EDITION: &str = "GeoLite2-ASN";
/// Editions downloaded when `GEOIPUPDATE_EDITION_IDS` is unset
pub const DEFAULT_EDITION_IDS: &str = "GeoLite2-City GeoLite2-ASN";
/// File extension of MaxMind DB files
pub const DB_EXTENSION: &str = "mmdb";

// Update origin
/// MaxMind update service base URL
pub const MAXMIND_UPDATE_URL: &str = "https://updates.maxmind.com";
/// HTTP timeout for a single edition download
pub const UPDATE_HTTP_TIMEOUT: Duration = Duration::from_secs(2 * 60);
/// Maximum number of response body bytes kept in a download error message
pub const MAX_ERROR_BODY_CHARS: usize = 512;

// Scheduling
/// Default interval between background refresh cycles (24 hours)
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
/// Longest accepted refresh interval (one year)
pub const MAX_UPDATE_INTERVAL: Duration = Duration::from_secs(MAX_UPDATE_INTERVAL_HOURS * 60 * 60);
/// [`MAX_UPDATE_INTERVAL`] in hours, the unit of `--update-interval-hours`
pub const MAX_UPDATE_INTERVAL_HOURS: u64 = 365 * 24;

// Caching
/// Lifetime of composed lookup results (10 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

// Network operation timeouts
/// DNS query timeout in seconds for reverse lookups
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// DNS attempts before a reverse lookup gives up
pub const DNS_ATTEMPTS: usize = 2;

// Environment variables
/// MaxMind account id
pub const ACCOUNT_ID_ENV: &str = "GEOIPUPDATE_ACCOUNT_ID";
/// MaxMind license key
pub const LICENSE_KEY_ENV: &str = "GEOIPUPDATE_LICENSE_KEY";
/// Whitespace separated edition ids
pub const EDITION_IDS_ENV: &str = "GEOIPUPDATE_EDITION_IDS";
/// Directory holding the .mmdb files
pub const DB_DIR_ENV: &str = "GEOIPUPDATE_DB_DIR";
/// Override for the update service base URL
pub const UPDATE_URL_ENV: &str = "GEOIPUPDATE_URL";

/// User-Agent sent to the update service
pub const USER_AGENT: &str = concat!("ipinfo/", env!("CARGO_PKG_VERSION"));
