//! Background database refresh.
//!
//! One refresh cycle downloads every configured edition, validates the new
//! files, moves them over their targets and installs a new generation. A
//! failed edition never blocks the others; the previous generation keeps
//! serving until a complete replacement is ready.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempPath;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::download::{Downloader, FetchOutcome};
use super::index::build_prefix_index_async;
use super::loader::open_database_async;
use super::store::DatabaseStore;
use super::types::{Database, Generation};
use crate::config::MAX_UPDATE_INTERVAL;
use crate::error_handling::DatabaseError;

/// An edition that could not be updated this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEdition {
    /// Edition id
    pub edition: String,
    /// Error text
    pub error: String,
}

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Editions downloaded and committed to disk
    pub downloaded: Vec<String>,
    /// Editions the service reported as current
    pub not_modified: Vec<String>,
    /// Editions that failed to download or commit
    pub failed: Vec<FailedEdition>,
    /// Whether a new generation was installed
    pub swapped: bool,
}

/// Refreshes the databases behind a [`DatabaseStore`].
#[derive(Debug)]
pub struct Updater {
    downloader: Option<Downloader>,
    store: Arc<DatabaseStore>,
    editions: Vec<String>,
    city_edition: String,
    asn_edition: String,
    refresh_lock: Mutex<()>,
}

impl Updater {
    /// Creates an updater.
    ///
    /// `downloader` is `None` when no credentials are configured; every
    /// refresh then fails with `DatabaseError::Configuration`.
    pub fn new(
        downloader: Option<Downloader>,
        store: Arc<DatabaseStore>,
        editions: Vec<String>,
        city_edition: impl Into<String>,
        asn_edition: impl Into<String>,
    ) -> Self {
        Self {
            downloader,
            store,
            editions,
            city_edition: city_edition.into(),
            asn_edition: asn_edition.into(),
            refresh_lock: Mutex::new(()),
        }
    }

    fn is_loaded(&self, edition: &str) -> bool {
        edition == self.city_edition || edition == self.asn_edition
    }

    /// Runs one refresh cycle.
    ///
    /// Concurrent calls on the same updater run one after the other.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Configuration` if no credentials are configured
    /// - `DatabaseError::Open` if a downloaded city or AS file does not open;
    ///   nothing is committed and the current generation stays in service
    /// - `DatabaseError::Closed` if the store was closed
    ///
    /// Download and commit failures of single editions are reported in
    /// [`RefreshReport::failed`] instead.
    pub async fn refresh(&self) -> Result<RefreshReport, DatabaseError> {
        let downloader = self.downloader.as_ref().ok_or_else(|| {
            DatabaseError::Configuration(
                "GEOIPUPDATE_ACCOUNT_ID and GEOIPUPDATE_LICENSE_KEY must be set to download databases"
                    .to_string(),
            )
        })?;
        // One cycle at a time: `refresh_now` may race a scheduled tick
        let _cycle = self.refresh_lock.lock().await;
        let started = Instant::now();
        let mut report = RefreshReport::default();

        let mut downloads: Vec<(String, TempPath)> = Vec::new();
        for edition in &self.editions {
            match downloader.fetch_edition(edition).await {
                Ok(FetchOutcome::NotModified) => report.not_modified.push(edition.clone()),
                Ok(FetchOutcome::Downloaded(path)) => downloads.push((edition.clone(), path)),
                Err(e) => {
                    log::warn!("{e}");
                    report.failed.push(FailedEdition {
                        edition: edition.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Validate before anything touches the target files. Returning early
        // drops `downloads`, which deletes the temporary files.
        let mut fresh: HashMap<String, Database> = HashMap::new();
        for (edition, path) in &downloads {
            if !self.is_loaded(edition) {
                continue;
            }
            match open_database_async(path.to_path_buf(), edition.clone()).await {
                Ok(db) => {
                    fresh.insert(edition.clone(), db);
                }
                Err(e) => {
                    log::error!("Downloaded {edition} is not a valid database, keeping the current databases: {e}");
                    return Err(e);
                }
            }
        }

        for (edition, temp) in downloads {
            let target = downloader.target_path(&edition);
            match temp.persist(&target) {
                Ok(()) => {
                    log::info!("Updated {} at {}", edition, target.display());
                    if let Some(db) = fresh.get_mut(&edition) {
                        db.metadata.path = target;
                    }
                    report.downloaded.push(edition);
                }
                Err(e) => {
                    let err = DatabaseError::Commit {
                        path: target,
                        source: e.error,
                    };
                    log::warn!("{err}");
                    fresh.remove(&edition);
                    report.failed.push(FailedEdition {
                        edition,
                        error: err.to_string(),
                    });
                }
            }
        }

        let new_city = fresh.remove(&self.city_edition);
        let new_asn = fresh.remove(&self.asn_edition);
        if new_city.is_none() && new_asn.is_none() {
            log::info!(
                "Databases unchanged ({} not modified, {} failed) in {:?}",
                report.not_modified.len(),
                report.failed.len(),
                started.elapsed()
            );
            return Ok(report);
        }

        let new_asn = match new_asn {
            Some(asn) => {
                let index = build_prefix_index_async(asn.clone()).await?;
                Some((asn, Arc::new(index)))
            }
            None => None,
        };

        // Held-over handles come from whatever generation is current at swap
        // time; another updater on the same store may have installed one
        // since this cycle started.
        let mut current = self.store.get().ok_or(DatabaseError::Closed)?;
        loop {
            let city = new_city.clone().unwrap_or_else(|| current.city().clone());
            let (asn, prefix_index) = match &new_asn {
                Some((asn, index)) => (asn.clone(), Arc::clone(index)),
                // The index belongs to the AS handle; keep them together
                None => (current.asn().clone(), Arc::clone(&current.prefix_index)),
            };
            if self
                .store
                .swap_if_current(&current, Generation::new(city, asn, prefix_index))
            {
                break;
            }
            log::debug!("Database generation changed during refresh, rebasing");
            current = self.store.get().ok_or(DatabaseError::Closed)?;
        }
        drop(current);
        report.swapped = true;
        log::info!(
            "Installed new database generation ({} updated, {} failed) in {:?}",
            report.downloaded.len(),
            report.failed.len(),
            started.elapsed()
        );
        Ok(report)
    }

    /// Runs [`Updater::refresh`] every `interval` until `cancel` fires.
    ///
    /// The first refresh happens one interval after the call. Cancellation is
    /// observed between cycles: a refresh in progress finishes first.
    /// `interval` is clamped to at most [`MAX_UPDATE_INTERVAL`].
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken, interval: Duration) -> RefreshTask {
        let interval = interval.clamp(Duration::from_millis(1), MAX_UPDATE_INTERVAL);
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        log::info!("Database refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match self.refresh().await {
                            Ok(report) if !report.failed.is_empty() => {
                                log::warn!(
                                    "Database refresh finished with failures: {:?}",
                                    report.failed.iter().map(|f| f.edition.as_str()).collect::<Vec<_>>()
                                );
                            }
                            Ok(_) => {}
                            Err(e) => log::error!("Database refresh failed: {e}"),
                        }
                    }
                }
            }
        });

        RefreshTask { cancel, handle }
    }
}

/// Handle of the background refresh loop.
///
/// Call [`RefreshTask::shutdown`] before closing the database store.
#[derive(Debug)]
pub struct RefreshTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Stops future refresh cycles and waits for the loop to exit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Task` if the loop panicked.
    pub async fn shutdown(self) -> Result<(), DatabaseError> {
        self.cancel.cancel();
        self.handle.await?;
        Ok(())
    }

    /// Whether the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
