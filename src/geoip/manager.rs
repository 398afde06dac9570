//! Database lifecycle facade.
//!
//! [`GeoIpManager`] opens the initial generation (downloading missing files
//! when credentials allow), owns the [`DatabaseStore`], and starts the
//! background refresh loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::download::{Downloader, FetchOutcome};
use super::index::build_prefix_index_async;
use super::loader::open_database_async;
use super::store::DatabaseStore;
use super::types::{Generation, GenerationInfo};
use super::updater::{RefreshReport, RefreshTask, Updater};
use crate::config::{Config, MAX_UPDATE_INTERVAL};
use crate::error_handling::DatabaseError;
use crate::initialization::init_update_client;

/// Owner of the database lifecycle.
#[derive(Debug)]
pub struct GeoIpManager {
    config: Config,
    store: Arc<DatabaseStore>,
    updater: Arc<Updater>,
}

impl GeoIpManager {
    /// Opens the configured databases.
    ///
    /// If either file is missing or unreadable and credentials are configured,
    /// the configured editions are downloaded once and opened again.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::Configuration` if the databases cannot be opened and
    ///   no credentials are configured
    /// - `DatabaseError::Download` / `DatabaseError::Open` if the startup
    ///   download or the second open fails
    pub async fn open(config: Config) -> Result<Self, DatabaseError> {
        let downloader = match &config.credentials {
            Some(credentials) => {
                let client = init_update_client(config.http_timeout).map_err(|e| {
                    DatabaseError::Configuration(format!("could not build HTTP client: {e}"))
                })?;
                Some(Downloader::new(
                    client,
                    config.update_url.clone(),
                    credentials.clone(),
                    config.db_dir.clone(),
                ))
            }
            None => None,
        };

        let generation = match open_generation(&config).await {
            Ok(generation) => generation,
            Err(open_err) => {
                let Some(downloader) = &downloader else {
                    return Err(DatabaseError::Configuration(format!(
                        "{open_err}; set GEOIPUPDATE_ACCOUNT_ID and GEOIPUPDATE_LICENSE_KEY to download the databases"
                    )));
                };
                log::warn!("{open_err}; downloading databases");
                download_initial(downloader, &config).await?;
                open_generation(&config).await?
            }
        };

        let info = generation.info();
        log::info!(
            "Serving {} and {} ({} AS numbers indexed)",
            info.city.version(),
            info.asn.version(),
            info.indexed_asns
        );

        let store = Arc::new(DatabaseStore::new(generation));
        let updater = Arc::new(Updater::new(
            downloader,
            Arc::clone(&store),
            config.edition_ids.clone(),
            config.city_edition.clone(),
            config.asn_edition.clone(),
        ));

        Ok(Self {
            config,
            store,
            updater,
        })
    }

    /// Store the lookups read from.
    pub fn store(&self) -> Arc<DatabaseStore> {
        Arc::clone(&self.store)
    }

    /// Configuration the manager was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metadata of the generation being served.
    pub fn info(&self) -> Option<GenerationInfo> {
        self.store.info()
    }

    /// Runs one refresh cycle now.
    ///
    /// # Errors
    ///
    /// See [`Updater::refresh`].
    pub async fn refresh_now(&self) -> Result<RefreshReport, DatabaseError> {
        self.updater.refresh().await
    }

    /// Starts refreshing every `interval` until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Configuration` if no credentials are configured
    /// or `interval` is zero or longer than a year. The service keeps serving the loaded databases.
    pub fn start_background_refresh(
        &self,
        cancel: CancellationToken,
        interval: Duration,
    ) -> Result<RefreshTask, DatabaseError> {
        if self.config.credentials.is_none() {
            return Err(DatabaseError::Configuration(
                "background refresh needs GEOIPUPDATE_ACCOUNT_ID and GEOIPUPDATE_LICENSE_KEY"
                    .to_string(),
            ));
        }
        if interval.is_zero() || interval > MAX_UPDATE_INTERVAL {
            return Err(DatabaseError::Configuration(format!(
                "refresh interval must be positive and at most {MAX_UPDATE_INTERVAL:?}"
            )));
        }
        log::info!("Refreshing databases every {:?}", interval);
        Ok(Arc::clone(&self.updater).spawn(cancel, interval))
    }

    /// Releases the current generation. Call once, after the refresh task
    /// has been shut down.
    pub fn close(&self) {
        self.store.close();
    }
}

/// Opens the city and AS files and indexes the AS database.
async fn open_generation(config: &Config) -> Result<Generation, DatabaseError> {
    let (city, asn) = tokio::join!(
        open_database_async(
            config.edition_path(&config.city_edition),
            config.city_edition.clone()
        ),
        open_database_async(
            config.edition_path(&config.asn_edition),
            config.asn_edition.clone()
        ),
    );
    let (city, asn) = (city?, asn?);
    let index = build_prefix_index_async(asn.clone()).await?;
    Ok(Generation::new(city, asn, Arc::new(index)))
}

/// Downloads every configured edition plus the two loaded ones.
///
/// Failures of the loaded editions are fatal; others are logged.
async fn download_initial(downloader: &Downloader, config: &Config) -> Result<(), DatabaseError> {
    let mut editions = vec![config.city_edition.clone(), config.asn_edition.clone()];
    for edition in &config.edition_ids {
        if !editions.contains(edition) {
            editions.push(edition.clone());
        }
    }

    for edition in editions {
        let required = edition == config.city_edition || edition == config.asn_edition;
        match downloader.fetch_edition(&edition).await {
            Ok(FetchOutcome::NotModified) => {
                log::debug!("{edition} is already current on disk");
            }
            Ok(FetchOutcome::Downloaded(temp)) => {
                let target = downloader.target_path(&edition);
                temp.persist(&target).map_err(|e| DatabaseError::Commit {
                    path: target.clone(),
                    source: e.error,
                })?;
                log::info!("Installed {} at {}", edition, target.display());
            }
            Err(e) if required => return Err(e.into()),
            Err(e) => log::warn!("{e}"),
        }
    }
    Ok(())
}
