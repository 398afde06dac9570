//! Lookups over the current database generation.
//!
//! This module provides:
//! - [`LookupService`] answering IP and AS number queries with caching
//! - Result types ([`GeoRecord`], [`AsnResponse`])
//! - [`parse_asn`] for user-supplied AS numbers

mod parse;
mod service;
mod types;

// Re-export public API
pub use parse::parse_asn;
pub use service::LookupService;
pub use types::{AsnPrefixes, AsnResponse, GeoRecord};
