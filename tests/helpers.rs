// Shared test helpers for fixture databases and update-server setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use flate2::write::GzEncoder;
use flate2::Compression;
use ipinfo::{Config, Credentials};

#[path = "../src/test_helpers/mmdb_writer.rs"]
#[allow(dead_code)]
pub mod mmdb_writer;

pub const CITY: &str = "GeoLite2-City";
pub const ASN: &str = "GeoLite2-ASN";

/// Gzip-compresses `data` the way the update service delivers databases.
#[allow(dead_code)] // Used by other test files
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("Failed to gzip fixture");
    encoder.finish().expect("Failed to finish gzip stream")
}

/// Writes the standard city and ASN fixtures into `dir`.
#[allow(dead_code)]
pub fn write_fixture_dbs(dir: &Path) {
    std::fs::write(db_path(dir, CITY), mmdb_writer::fixture_city_db())
        .expect("Failed to write city fixture");
    std::fs::write(db_path(dir, ASN), mmdb_writer::fixture_asn_db())
        .expect("Failed to write ASN fixture");
}

/// `<dir>/<edition>.mmdb`
#[allow(dead_code)]
pub fn db_path(dir: &Path, edition: &str) -> std::path::PathBuf {
    dir.join(format!("{edition}.mmdb"))
}

/// Configuration without credentials: local files only.
#[allow(dead_code)]
pub fn offline_config(dir: &Path) -> Config {
    Config {
        db_dir: dir.to_path_buf(),
        reverse_dns: false,
        ..Config::default()
    }
}

/// Configuration pointing at a mock update server.
#[allow(dead_code)]
pub fn server_config(dir: &Path, server: &httptest::Server) -> Config {
    Config {
        db_dir: dir.to_path_buf(),
        update_url: format!("http://{}", server.addr()),
        credentials: Some(Credentials {
            account_id: "42".to_string(),
            license_key: "secret".to_string(),
        }),
        http_timeout: Duration::from_secs(10),
        reverse_dns: false,
        ..Config::default()
    }
}

/// Update endpoint path of an edition.
#[allow(dead_code)]
pub fn update_path(edition: &str) -> String {
    format!("/geoip/databases/{edition}/update")
}

/// Names of leftover temporary download files in `dir`.
#[allow(dead_code)]
pub fn temp_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .expect("Failed to read database directory")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect()
}
