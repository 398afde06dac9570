//! GeoIP database lifecycle.
//!
//! This module owns the MaxMind databases behind every lookup:
//! - opening files into immutable [`Generation`]s ([`open_database`])
//! - indexing AS numbers to announced prefixes ([`build_prefix_index`])
//! - serving and swapping the current generation ([`DatabaseStore`])
//! - conditional downloads from the update service ([`Downloader`])
//! - periodic refresh ([`Updater`], [`RefreshTask`])
//! - the [`GeoIpManager`] facade tying these together

mod download;
pub(crate) mod index;
mod loader;
mod manager;
mod metadata;
mod store;
pub(crate) mod types;
mod updater;

// Re-export public API
pub use download::{Downloader, FetchOutcome};
pub use index::build_prefix_index;
pub use loader::open_database;
pub use manager::GeoIpManager;
pub use store::DatabaseStore;
pub use types::{
    Database, DatabaseMetadata, GenerationInfo, GeoIpReader, Generation, PrefixIndex,
};
pub use updater::{FailedEdition, RefreshReport, RefreshTask, Updater};
