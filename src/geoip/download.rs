//! Edition downloads from the MaxMind update service.
//!
//! A download is conditional on the MD5 of the local file: the service answers
//! `304 Not Modified` when it is current. New content arrives gzip-compressed
//! and is decompressed chunk by chunk into a temporary file next to the
//! target, so the final rename stays on one filesystem.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::write::GzDecoder;
use md5::{Digest, Md5};
use reqwest::StatusCode;
use tempfile::TempPath;

use crate::config::{edition_path, Credentials, MAX_ERROR_BODY_CHARS};
use crate::error_handling::DownloadError;

/// Result of a conditional edition download.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The local file is current.
    NotModified,
    /// New content, decompressed into a temporary file.
    ///
    /// The file is deleted when the path is dropped without being persisted.
    Downloaded(TempPath),
}

/// Fetches database editions into a database directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Arc<reqwest::Client>,
    base_url: String,
    credentials: Credentials,
    db_dir: PathBuf,
}

impl Downloader {
    /// Creates a downloader.
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client (see `initialization::init_update_client`)
    /// * `base_url` - Update service base URL, without trailing slash
    /// * `credentials` - Account id and license key for basic auth
    /// * `db_dir` - Directory holding `<edition>.mmdb` files
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: impl Into<String>,
        credentials: Credentials,
        db_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            db_dir: db_dir.into(),
        }
    }

    /// Update endpoint of an edition.
    pub fn update_url(&self, edition: &str) -> String {
        format!("{}/geoip/databases/{}/update", self.base_url, edition)
    }

    /// Local target file of an edition.
    pub fn target_path(&self, edition: &str) -> PathBuf {
        edition_path(&self.db_dir, edition)
    }

    /// Downloads `edition` if the service has a newer copy than the local file.
    ///
    /// A missing local file is hashed as the empty string, which makes the
    /// request unconditional. The target file is never modified here.
    ///
    /// # Errors
    ///
    /// Returns a `DownloadError` naming the edition when the request fails,
    /// the service answers with a non-success status, or the body cannot be
    /// decompressed to disk. Any partial temporary file is removed.
    pub async fn fetch_edition(&self, edition: &str) -> Result<FetchOutcome, DownloadError> {
        let target = self.target_path(edition);
        let hash = local_md5(target)
            .await
            .map_err(|source| DownloadError::Io {
                edition: edition.to_string(),
                context: "could not hash the local database",
                source,
            })?;

        let url = self.update_url(edition);
        log::debug!("Checking {} for updates (db_md5={:?})", url, hash);

        let request_error = |source| DownloadError::Request {
            edition: edition.to_string(),
            source,
        };

        let mut response = self
            .client
            .get(&url)
            .query(&[("db_md5", hash.as_str())])
            .basic_auth(
                &self.credentials.account_id,
                Some(&self.credentials.license_key),
            )
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            log::debug!("{} is up to date", edition);
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            // The status is the useful part; an unreadable body is not worth a second error
            let body = response.text().await.unwrap_or_default();
            return Err(DownloadError::Status {
                edition: edition.to_string(),
                status,
                body: truncate_body(body.trim()),
            });
        }

        let io_error = |context: &'static str| {
            move |source| DownloadError::Io {
                edition: edition.to_string(),
                context,
                source,
            }
        };

        let temp = tempfile::Builder::new()
            .prefix(&format!("{edition}."))
            .suffix(".tmp")
            .tempfile_in(&self.db_dir)
            .map_err(io_error("could not create temporary file"))?;
        let (file, temp_path) = temp.into_parts();

        let mut decoder = GzDecoder::new(file);
        let mut compressed = 0usize;
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            compressed += chunk.len();
            decoder
                .write_all(&chunk)
                .map_err(io_error("could not decompress response"))?;
        }
        let file = decoder
            .finish()
            .map_err(io_error("could not decompress response"))?;
        file.sync_all()
            .map_err(io_error("could not flush temporary file"))?;

        log::info!(
            "Downloaded {} ({} bytes compressed) to {}",
            edition,
            compressed,
            temp_path.display()
        );
        Ok(FetchOutcome::Downloaded(temp_path))
    }
}

/// Lower-case hex MD5 of a file; empty when the file does not exist.
pub(crate) async fn local_md5(path: PathBuf) -> io::Result<String> {
    tokio::task::spawn_blocking(move || md5_file(&path))
        .await
        .map_err(io::Error::other)?
}

fn md5_file(path: &Path) -> io::Result<String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(e),
    };
    let mut hasher = Md5::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
