//! Graceful shutdown handling.

use crate::geoip::{GeoIpManager, RefreshTask};

/// Stops background work and releases the databases.
///
/// The refresh loop is cancelled and awaited before the store is closed, so
/// no refresh can install a generation after shutdown. Lookups still holding
/// a generation finish normally.
pub async fn shutdown_gracefully(refresh_task: Option<RefreshTask>, manager: &GeoIpManager) {
    if let Some(task) = refresh_task {
        if let Err(e) = task.shutdown().await {
            log::warn!("Database refresh task ended abnormally: {e}");
        }
    }
    manager.close();
}
