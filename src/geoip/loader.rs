//! Opening database files.
//!
//! Files are read fully into memory; a handle stays valid after its file is
//! replaced on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use maxminddb::Reader;

use super::metadata::extract_metadata;
use super::types::Database;
use crate::error_handling::DatabaseError;

/// Opens and validates a MaxMind DB file.
///
/// # Arguments
///
/// * `path` - File to open
/// * `edition` - Edition id recorded in the handle's metadata
///
/// # Errors
///
/// Returns `DatabaseError::Open` if the file is missing, unreadable, or not a
/// valid MaxMind DB.
pub fn open_database(path: &Path, edition: &str) -> Result<Database, DatabaseError> {
    let reader = Reader::open_readfile(path).map_err(|e| DatabaseError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let metadata = extract_metadata(&reader, edition, path);
    log::debug!(
        "Opened {} from {} (type {}, build epoch {}, {} nodes)",
        edition,
        path.display(),
        metadata.database_type,
        metadata.build_epoch,
        reader.metadata.node_count
    );

    Ok(Database {
        reader: Arc::new(reader),
        metadata,
    })
}

/// [`open_database`] on the blocking thread pool.
pub(crate) async fn open_database_async(
    path: PathBuf,
    edition: String,
) -> Result<Database, DatabaseError> {
    tokio::task::spawn_blocking(move || open_database(&path, &edition)).await?
}
