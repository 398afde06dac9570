//! Shared fixtures for unit tests.

pub mod mmdb_writer;

use std::path::Path;
use std::sync::Arc;

use crate::geoip::{build_prefix_index, Database, Generation};

/// Writes `bytes` to `<dir>/<edition>.mmdb` and opens it.
pub fn open_fixture(dir: &Path, edition: &str, bytes: &[u8]) -> Database {
    let path = crate::config::edition_path(dir, edition);
    std::fs::write(&path, bytes).expect("failed to write fixture database");
    crate::geoip::open_database(&path, edition).expect("fixture database should open")
}

/// Opens the standard city and ASN fixtures from `dir` as one generation.
pub fn fixture_generation(dir: &Path) -> Generation {
    let city = open_fixture(dir, "GeoLite2-City", &mmdb_writer::fixture_city_db());
    let asn = open_fixture(dir, "GeoLite2-ASN", &mmdb_writer::fixture_asn_db());
    let index = build_prefix_index(&asn).expect("fixture index should build");
    Generation::new(city, asn, Arc::new(index))
}
