//! AS number to prefix index.
//!
//! The index is built with one pass over every network of the AS database and
//! is read-only afterwards.

use std::net::IpAddr;
use std::time::Instant;

use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use serde::Deserialize;

use super::types::{Database, PrefixIndex};
use crate::error_handling::DatabaseError;

/// Only the AS number is needed while indexing.
#[derive(Deserialize)]
struct AsnEntry {
    #[serde(default)]
    autonomous_system_number: Option<u32>,
}

/// Builds the AS number to prefix index of an AS database.
///
/// Entries that fail to decode are skipped and counted. Entries without an AS
/// number (or with AS number 0) are skipped. IPv4 networks stored under `::/96`
/// are indexed as IPv4 networks; the IPv4 alias subtrees are ignored so every
/// network is indexed once. Prefix lists keep scan order.
///
/// # Errors
///
/// Returns `DatabaseError::Open` if the search tree cannot be traversed at all.
pub fn build_prefix_index(db: &Database) -> Result<PrefixIndex, DatabaseError> {
    let started = Instant::now();
    let reader = db.reader();
    let open_error = |reason: String| DatabaseError::Open {
        path: db.metadata().path.clone(),
        reason,
    };

    let root = scan_root(reader.metadata.ip_version).map_err(|e| open_error(e.to_string()))?;
    let networks = reader
        .within::<AsnEntry>(root)
        .map_err(|e| open_error(e.to_string()))?;

    let mut index = PrefixIndex::new();
    let mut entries = 0usize;
    let mut skipped = 0usize;

    for item in networks {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                log::debug!("Skipping undecodable AS database entry: {e}");
                skipped += 1;
                continue;
            }
        };
        if is_ipv4_alias(&item.ip_net) {
            continue;
        }
        match item.info.autonomous_system_number {
            Some(asn) if asn != 0 => {
                index.entry(asn).or_insert_with(Vec::new).push(item.ip_net);
                entries += 1;
            }
            _ => skipped += 1,
        }
    }

    log::info!(
        "Indexed {} prefixes for {} AS numbers from {} in {:?} ({} entries skipped)",
        entries,
        index.len(),
        db.metadata().edition,
        started.elapsed(),
        skipped
    );

    Ok(index)
}

/// [`build_prefix_index`] on the blocking thread pool.
pub(crate) async fn build_prefix_index_async(db: Database) -> Result<PrefixIndex, DatabaseError> {
    tokio::task::spawn_blocking(move || build_prefix_index(&db)).await?
}

fn scan_root(ip_version: u16) -> Result<IpNetwork, ipnetwork::IpNetworkError> {
    if ip_version == 6 {
        Ok(IpNetwork::V6(Ipv6Network::new(
            std::net::Ipv6Addr::UNSPECIFIED,
            0,
        )?))
    } else {
        Ok(IpNetwork::V4(Ipv4Network::new(
            std::net::Ipv4Addr::UNSPECIFIED,
            0,
        )?))
    }
}

/// IPv4-mapped (`::ffff:0:0/96`) and 6to4 (`2002::/16`) copies of the IPv4 tree.
fn is_ipv4_alias(network: &IpNetwork) -> bool {
    let IpNetwork::V6(v6) = network else {
        return false;
    };
    let segments = v6.network().segments();
    let mapped = v6.prefix() >= 96 && segments[..5] == [0; 5] && segments[5] == 0xffff;
    let six_to_four = v6.prefix() >= 16 && segments[0] == 0x2002;
    mapped || six_to_four
}

/// Address family of a prefix, used to partition query results.
pub(crate) fn is_ipv4(network: &IpNetwork) -> bool {
    matches!(network.ip(), IpAddr::V4(_))
}
