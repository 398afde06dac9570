//! IP and AS number lookups.
//!
//! Results are composed from one database generation per query and cached by
//! typed key. Cached values hold no database handles, so they stay valid
//! across generation swaps.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use hickory_resolver::TokioAsyncResolver;
use ipnetwork::IpNetwork;
use maxminddb::MaxMindDBError;
use serde::de::DeserializeOwned;

use super::types::{AsnPrefixes, AsnResponse, GeoRecord};
use crate::cache::ResultCache;
use crate::dns::reverse_dns_lookup;
use crate::error_handling::LookupError;
use crate::geoip::index::is_ipv4;
use crate::geoip::types::{AsnRecord, CityRecord};
use crate::geoip::{Database, DatabaseStore, Generation};

/// Answers IP and AS number queries.
#[derive(Debug)]
pub struct LookupService {
    store: Arc<DatabaseStore>,
    resolver: Option<Arc<TokioAsyncResolver>>,
    ip_cache: ResultCache<IpAddr, GeoRecord>,
    asn_cache: ResultCache<u32, AsnResponse>,
}

impl LookupService {
    /// Creates a lookup service.
    ///
    /// # Arguments
    ///
    /// * `store` - Source of database generations
    /// * `resolver` - Resolver for the `hostname` field; `None` disables reverse DNS
    /// * `cache_ttl` - Lifetime of cached results
    pub fn new(
        store: Arc<DatabaseStore>,
        resolver: Option<Arc<TokioAsyncResolver>>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            resolver,
            ip_cache: ResultCache::new(cache_ttl),
            asn_cache: ResultCache::new(cache_ttl),
        }
    }

    /// Looks up everything known about `ip`.
    ///
    /// An address missing from a database contributes no fields. Returns
    /// `None` when no generation is being served or a record cannot be
    /// decoded.
    pub async fn lookup_ip(&self, ip: IpAddr) -> Option<GeoRecord> {
        if let Some(hit) = self.ip_cache.get(&ip) {
            return Some(hit);
        }

        let mut record = {
            let generation = self.store.get()?;
            match compose_ip_record(&generation, ip) {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("Could not decode database records for {ip}: {e}");
                    return None;
                }
            }
        };

        if let Some(resolver) = &self.resolver {
            record.hostname = reverse_dns_lookup(ip, resolver).await;
        }

        self.ip_cache.set(ip, record.clone());
        Some(record)
    }

    /// Looks up the organization and announced prefixes of `asn`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` when the AS number has no prefixes in
    /// the current data.
    pub fn lookup_asn(&self, asn: u32) -> Result<AsnResponse, LookupError> {
        if let Some(hit) = self.asn_cache.get(&asn) {
            return Ok(hit);
        }

        let generation = self.store.get().ok_or(LookupError::NotFound(asn))?;
        let response = compose_asn_response(&generation, asn)?;
        drop(generation);

        self.asn_cache.set(asn, response.clone());
        Ok(response)
    }

    /// Drops every cached result.
    pub fn clear_cache(&self) {
        self.ip_cache.clear();
        self.asn_cache.clear();
    }
}

/// Looks up `ip` in `db`, mapping "not in this database" to `None`.
fn lookup_record<T: DeserializeOwned>(db: &Database, ip: IpAddr) -> Result<Option<T>, MaxMindDBError> {
    match db.reader().lookup::<T>(ip) {
        Ok(record) => Ok(Some(record)),
        Err(MaxMindDBError::AddressNotFoundError(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn format_org(record: &AsnRecord) -> Option<String> {
    let asn = record.autonomous_system_number.filter(|&n| n != 0)?;
    match non_empty(record.autonomous_system_organization.as_deref()) {
        Some(org) => Some(format!("AS{asn} {org}")),
        None => Some(format!("AS{asn}")),
    }
}

fn compose_ip_record(generation: &Generation, ip: IpAddr) -> Result<GeoRecord, MaxMindDBError> {
    let mut record = GeoRecord::new(ip);

    if let Some(asn) = lookup_record::<AsnRecord>(generation.asn(), ip)? {
        record.org = format_org(&asn);
    }

    if let Some(city) = lookup_record::<CityRecord>(generation.city(), ip)? {
        record.city = non_empty(city.city.as_ref().and_then(|c| c.english()));
        record.region = non_empty(city.subdivisions.first().and_then(|s| s.english()));
        record.country = non_empty(city.country.as_ref().and_then(|c| c.iso_code.as_deref()));
        if let Some(location) = &city.location {
            record.timezone = non_empty(location.time_zone.as_deref());
            if let (Some(lat), Some(lon)) = (location.latitude, location.longitude) {
                record.loc = Some(format!("{lat:.4},{lon:.4}"));
            }
        }
    }

    Ok(record)
}

fn compose_asn_response(generation: &Generation, asn: u32) -> Result<AsnResponse, LookupError> {
    let prefixes = generation
        .prefix_index()
        .get(&asn)
        .filter(|prefixes| !prefixes.is_empty())
        .ok_or(LookupError::NotFound(asn))?;

    let name = match lookup_record::<AsnRecord>(generation.asn(), prefixes[0].ip()) {
        Ok(Some(record)) => record.autonomous_system_organization.unwrap_or_default(),
        Ok(None) => String::new(),
        Err(e) => {
            log::debug!("Could not decode organization of AS{asn}: {e}");
            String::new()
        }
    };

    let (ipv4, ipv6): (Vec<&IpNetwork>, Vec<&IpNetwork>) =
        prefixes.iter().partition(|n| is_ipv4(n));
    let mut ipv4: Vec<String> = ipv4.into_iter().map(|n| n.to_string()).collect();
    let mut ipv6: Vec<String> = ipv6.into_iter().map(|n| n.to_string()).collect();
    // Text order, not address order
    ipv4.sort();
    ipv6.sort();

    Ok(AsnResponse {
        asn,
        name,
        prefixes: AsnPrefixes { ipv4, ipv6 },
    })
}
