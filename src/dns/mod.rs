//! DNS helpers.
//!
//! Reverse lookups via `hickory-resolver`, used to fill the `hostname` field
//! of IP results.

mod resolution;

// Re-export public API
pub use resolution::reverse_dns_lookup;
