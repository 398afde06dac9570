//! Configuration types and CLI options.
//!
//! This module defines the library configuration ([`Config`]), the update
//! credentials, and the `clap` command line of the binary.

use std::fmt;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::*;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// MaxMind account credentials used for the update service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account id (basic auth user)
    pub account_id: String,
    /// License key (basic auth password)
    pub license_key: String,
}

// The license key is a secret; keep it out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("license_key", &"<redacted>")
            .finish()
    }
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use ipinfo::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_dir: PathBuf::from("/var/lib/ipinfo"),
///     ..Config::from_env()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `<edition>.mmdb` files
    pub db_dir: PathBuf,

    /// Edition answering city / country / location queries
    pub city_edition: String,

    /// Edition answering AS-number queries (and backing the prefix index)
    pub asn_edition: String,

    /// Editions downloaded on every refresh cycle
    pub edition_ids: Vec<String>,

    /// Update service base URL
    pub update_url: String,

    /// Update credentials; `None` disables downloads
    pub credentials: Option<Credentials>,

    /// Interval between background refresh cycles
    pub update_interval: Duration,

    /// Lifetime of cached lookup results
    pub cache_ttl: Duration,

    /// Timeout of a single edition download
    pub http_timeout: Duration,

    /// Perform reverse DNS lookups for IP results
    pub reverse_dns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_dir: PathBuf::from("."),
            city_edition: CITY_EDITION.to_string(),
            asn_edition: ASN_EDITION.to_string(),
            edition_ids: split_editions(DEFAULT_EDITION_IDS),
            update_url: MAXMIND_UPDATE_URL.to_string(),
            credentials: None,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            cache_ttl: DEFAULT_CACHE_TTL,
            http_timeout: UPDATE_HTTP_TIMEOUT,
            reverse_dns: true,
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// Reads `GEOIPUPDATE_ACCOUNT_ID`, `GEOIPUPDATE_LICENSE_KEY`,
    /// `GEOIPUPDATE_EDITION_IDS`, `GEOIPUPDATE_DB_DIR` and `GEOIPUPDATE_URL`.
    /// Unset or empty variables fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        // Both halves are required; a lone account id is as good as nothing
        if let (Some(account_id), Some(license_key)) = (get(ACCOUNT_ID_ENV), get(LICENSE_KEY_ENV)) {
            config.credentials = Some(Credentials {
                account_id: account_id.trim().to_string(),
                license_key: license_key.trim().to_string(),
            });
        }
        if let Some(ids) = get(EDITION_IDS_ENV) {
            config.edition_ids = split_editions(&ids);
        }
        if let Some(dir) = get(DB_DIR_ENV) {
            config.db_dir = PathBuf::from(dir);
        }
        if let Some(url) = get(UPDATE_URL_ENV) {
            config.update_url = url.trim_end_matches('/').to_string();
        }
        config
    }

    /// Local path of an edition's database file.
    pub fn edition_path(&self, edition: &str) -> PathBuf {
        edition_path(&self.db_dir, edition)
    }
}

/// Builds `<dir>/<edition>.mmdb`.
pub fn edition_path(dir: &Path, edition: &str) -> PathBuf {
    dir.join(format!("{}.{}", edition, DB_EXTENSION))
}

fn split_editions(ids: &str) -> Vec<String> {
    ids.split_whitespace().map(str::to_string).collect()
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Look up one address
/// ipinfo lookup 8.8.8.8
///
/// # List the prefixes announced by an AS
/// ipinfo asn AS15169
///
/// # Keep the databases fresh until Ctrl-C
/// ipinfo --update-interval-hours 12 serve
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "ipinfo",
    about = "Answers IP and AS number queries from self-updating GeoLite2 databases."
)]
pub struct Opt {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Directory holding the .mmdb files (overrides GEOIPUPDATE_DB_DIR)
    #[arg(long, value_parser)]
    pub db_dir: Option<PathBuf>,

    /// Hours between background database refreshes (1 to 8760)
    #[arg(
        long,
        default_value_t = 24,
        value_parser = clap::value_parser!(u64).range(1..=MAX_UPDATE_INTERVAL_HOURS)
    )]
    pub update_interval_hours: u64,

    /// Seconds a composed lookup result stays cached
    #[arg(long, default_value_t = 600)]
    pub cache_ttl_secs: u64,

    /// Skip reverse DNS lookups for IP results
    #[arg(long)]
    pub no_reverse_dns: bool,

    /// What to do once the databases are open
    #[command(subcommand)]
    pub command: Command,
}

/// Binary subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a single IP address
    Lookup {
        /// IPv4 or IPv6 address
        ip: IpAddr,
    },
    /// List the prefixes announced by an AS number (e.g. AS15169)
    Asn {
        /// AS number, with or without the AS prefix
        asn: String,
    },
    /// Keep the databases updated until interrupted
    Serve,
}

impl Opt {
    /// Merges the command-line flags over an environment-derived configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.db_dir {
            config.db_dir = dir.clone();
        }
        let hours = self.update_interval_hours.clamp(1, MAX_UPDATE_INTERVAL_HOURS);
        config.update_interval = Duration::from_secs(hours * 60 * 60);
        config.cache_ttl = Duration::from_secs(self.cache_ttl_secs);
        config.reverse_dns = !self.no_reverse_dns;
        config
    }
}
