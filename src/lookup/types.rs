//! Lookup result types.

use std::net::IpAddr;

use serde::Serialize;

/// Composed information about one IP address.
///
/// Every optional field is `None` when the data is unavailable; fields are
/// never empty strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoRecord {
    /// Canonical text form of the queried address
    pub ip: String,
    /// Reverse DNS name, without the trailing dot
    pub hostname: Option<String>,
    /// `AS<number> <organization>`
    pub org: Option<String>,
    /// City name (English)
    pub city: Option<String>,
    /// First subdivision name (English)
    pub region: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country: Option<String>,
    /// IANA time zone
    pub timezone: Option<String>,
    /// `latitude,longitude` with four decimals
    pub loc: Option<String>,
}

impl GeoRecord {
    /// Field names accepted by [`GeoRecord::field`], in output order.
    pub const FIELDS: [&'static str; 8] = [
        "ip", "hostname", "org", "city", "region", "country", "timezone", "loc",
    ];

    /// A record carrying only the address.
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_string(),
            hostname: None,
            org: None,
            city: None,
            region: None,
            country: None,
            timezone: None,
            loc: None,
        }
    }

    /// Value of a single named field.
    ///
    /// Returns `None` for unknown names and for fields without data; use
    /// [`GeoRecord::is_field`] to tell the two apart.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "ip" => Some(self.ip.as_str()),
            "hostname" => self.hostname.as_deref(),
            "org" => self.org.as_deref(),
            "city" => self.city.as_deref(),
            "region" => self.region.as_deref(),
            "country" => self.country.as_deref(),
            "timezone" => self.timezone.as_deref(),
            "loc" => self.loc.as_deref(),
            _ => None,
        }
    }

    /// Whether `name` is a known field.
    pub fn is_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// Prefixes announced by an AS, split by address family and sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AsnPrefixes {
    /// IPv4 prefixes in CIDR notation
    pub ipv4: Vec<String>,
    /// IPv6 prefixes in CIDR notation
    pub ipv6: Vec<String>,
}

/// Composed information about one AS number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsnResponse {
    /// The AS number
    pub asn: u32,
    /// Organization name; empty when the database has none
    pub name: String,
    /// Announced prefixes
    pub prefixes: AsnPrefixes,
}
