//! Metadata for loaded GeoIP databases.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use super::types::{DatabaseMetadata, GeoIpReader};

/// Extracts metadata from an open database.
pub(crate) fn extract_metadata(reader: &GeoIpReader, edition: &str, path: &Path) -> DatabaseMetadata {
    DatabaseMetadata {
        edition: edition.to_string(),
        path: path.to_path_buf(),
        build_epoch: reader.metadata.build_epoch,
        database_type: reader.metadata.database_type.clone(),
        loaded_at: SystemTime::now(),
    }
}

impl DatabaseMetadata {
    /// Build time as a UTC timestamp, if representable.
    pub fn built(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.build_epoch)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Short version label, e.g. `GeoLite2-City build 2024-05-03`.
    pub fn version(&self) -> String {
        match self.built() {
            Some(built) => format!("{} build {}", self.edition, built.format("%Y-%m-%d")),
            None => format!("{} build {}", self.edition, self.build_epoch),
        }
    }
}
