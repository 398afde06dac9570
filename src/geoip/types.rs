//! GeoIP data structures.
//!
//! This module defines the database handles, the generation that pairs them
//! with their prefix index, and the record shapes decoded from the MaxMind
//! databases.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use ipnetwork::IpNetwork;
use maxminddb::Reader;
use serde::{Deserialize, Serialize};

/// Reader over a database file loaded into memory.
pub type GeoIpReader = Reader<Vec<u8>>;

/// AS number to announced prefixes, in scan order.
pub type PrefixIndex = HashMap<u32, Vec<IpNetwork>>;

/// Metadata about one loaded database file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseMetadata {
    /// Edition id (e.g. `GeoLite2-City`)
    pub edition: String,
    /// File the handle was opened from
    pub path: PathBuf,
    /// Build time of the database, seconds since the Unix epoch
    pub build_epoch: u64,
    /// `database_type` from the file's metadata section
    pub database_type: String,
    /// When this handle was opened
    pub loaded_at: SystemTime,
}

/// An open database handle together with its metadata.
///
/// Cloning is cheap: the reader is shared.
#[derive(Clone)]
pub struct Database {
    pub(crate) reader: Arc<GeoIpReader>,
    pub(crate) metadata: DatabaseMetadata,
}

// The reader's Debug output includes the whole file buffer
impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// The underlying reader.
    pub fn reader(&self) -> &GeoIpReader {
        &self.reader
    }

    /// Metadata captured when the handle was opened.
    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    /// Whether two handles share the same reader.
    pub(crate) fn same_handle(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
    }
}

/// One consistent set of database handles and the prefix index built from
/// its AS handle.
///
/// A generation never changes after construction. The store replaces it as a
/// whole, so a reader holding one never sees a city handle, AS handle and index
/// from different refresh cycles.
#[derive(Debug)]
pub struct Generation {
    pub(crate) city: Database,
    pub(crate) asn: Database,
    pub(crate) prefix_index: Arc<PrefixIndex>,
    pub(crate) built_at: SystemTime,
}

impl Generation {
    /// Builds a generation from two handles and the index of `asn`.
    pub fn new(city: Database, asn: Database, prefix_index: Arc<PrefixIndex>) -> Self {
        Self {
            city,
            asn,
            prefix_index,
            built_at: SystemTime::now(),
        }
    }

    /// City database handle.
    pub fn city(&self) -> &Database {
        &self.city
    }

    /// AS database handle.
    pub fn asn(&self) -> &Database {
        &self.asn
    }

    /// Prefix index built from [`Generation::asn`].
    pub fn prefix_index(&self) -> &PrefixIndex {
        &self.prefix_index
    }

    /// When this generation was assembled.
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// Diagnostic summary of this generation.
    pub fn info(&self) -> GenerationInfo {
        GenerationInfo {
            city: self.city.metadata.clone(),
            asn: self.asn.metadata.clone(),
            built_at: self.built_at,
            indexed_asns: self.prefix_index.len(),
        }
    }
}

/// Snapshot of the current generation, for diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerationInfo {
    /// City database metadata
    pub city: DatabaseMetadata,
    /// AS database metadata
    pub asn: DatabaseMetadata,
    /// When the generation was assembled
    pub built_at: SystemTime,
    /// Number of AS numbers with at least one prefix
    pub indexed_asns: usize,
}

/// Localized names keyed by language code.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct NamedRecord {
    pub names: BTreeMap<String, String>,
}

impl NamedRecord {
    pub fn english(&self) -> Option<&str> {
        self.names.get("en").map(String::as_str)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CountryRecord {
    pub iso_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LocationRecord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time_zone: Option<String>,
}

/// The subset of a GeoLite2-City record used for IP results.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CityRecord {
    pub city: Option<NamedRecord>,
    pub subdivisions: Vec<NamedRecord>,
    pub country: Option<CountryRecord>,
    pub location: Option<LocationRecord>,
}

/// A GeoLite2-ASN record.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AsnRecord {
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
}
