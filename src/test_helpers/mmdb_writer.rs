//! Minimal MaxMind DB writer for test fixtures.
//!
//! Supports 24-bit records, IPv6 trees (IPv4 networks are stored under
//! `::/96`), and the data types the GeoLite2 City and ASN editions use.
//! Networks must not overlap.
//!
//! Shared by unit tests (`crate::test_helpers`) and integration tests
//! (included with `#[path]`), so it only depends on `std`.
#![allow(dead_code)]

use std::io;
use std::net::IpAddr;
use std::path::Path;

const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";
const DATA_SECTION_SEPARATOR: usize = 16;

/// AS number announcing both fixture networks.
pub const FIXTURE_ASN: u32 = 64500;
/// Organization of [`FIXTURE_ASN`].
pub const FIXTURE_ORG: &str = "Example Networks";
/// AS number present in the fixture with a single IPv4 prefix.
pub const SECOND_ASN: u32 = 64501;
/// Build epoch stamped into fixture databases (2024-05-03T00:00:00Z).
pub const FIXTURE_BUILD_EPOCH: u64 = 1_714_694_400;

/// A MaxMind DB data value.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Double(f64),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Bool(bool),
    Map(Vec<(String, Value)>),
    Array(Vec<Value>),
}

impl Value {
    /// Map from borrowed keys.
    pub fn map(entries: Vec<(&str, Value)>) -> Value {
        Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    pub fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum Record {
    Empty,
    Node(usize),
    Data(usize),
}

/// Builds a database in memory.
pub struct MmdbWriter {
    database_type: String,
    build_epoch: u64,
    nodes: Vec<[Record; 2]>,
    values: Vec<Value>,
}

impl MmdbWriter {
    pub fn new(database_type: &str) -> Self {
        Self {
            database_type: database_type.to_string(),
            build_epoch: FIXTURE_BUILD_EPOCH,
            nodes: vec![[Record::Empty, Record::Empty]],
            values: Vec::new(),
        }
    }

    pub fn build_epoch(mut self, build_epoch: u64) -> Self {
        self.build_epoch = build_epoch;
        self
    }

    /// Inserts `value` for `network` (e.g. `"10.0.0.0/24"` or `"2001:db8::/32"`).
    ///
    /// # Panics
    ///
    /// Panics on malformed input or when the network overlaps an earlier one.
    pub fn insert(&mut self, network: &str, value: Value) -> &mut Self {
        let (addr, prefix) = network
            .split_once('/')
            .unwrap_or_else(|| panic!("network {network:?} has no prefix length"));
        let addr: IpAddr = addr.parse().expect("invalid network address");
        let prefix: usize = prefix.parse().expect("invalid prefix length");
        let (bytes, bits) = match addr {
            IpAddr::V4(v4) => {
                assert!(prefix <= 32, "IPv4 prefix too long");
                let mut bytes = [0u8; 16];
                bytes[12..].copy_from_slice(&v4.octets());
                (bytes, prefix + 96)
            }
            IpAddr::V6(v6) => {
                assert!(prefix <= 128, "IPv6 prefix too long");
                (v6.octets(), prefix)
            }
        };
        assert!(bits > 0, "cannot insert the whole address space");

        self.values.push(value);
        let data = self.values.len() - 1;

        let mut node = 0;
        for i in 0..bits {
            let bit = ((bytes[i / 8] >> (7 - (i % 8))) & 1) as usize;
            if i == bits - 1 {
                match self.nodes[node][bit] {
                    Record::Empty => self.nodes[node][bit] = Record::Data(data),
                    _ => panic!("network {network} overlaps an existing entry"),
                }
                break;
            }
            node = match self.nodes[node][bit] {
                Record::Node(next) => next,
                Record::Empty => {
                    self.nodes.push([Record::Empty, Record::Empty]);
                    let next = self.nodes.len() - 1;
                    self.nodes[node][bit] = Record::Node(next);
                    next
                }
                Record::Data(_) => panic!("network {network} is inside an existing entry"),
            };
        }
        self
    }

    /// Serializes the database.
    pub fn to_bytes(&self) -> Vec<u8> {
        let node_count = self.nodes.len();

        let mut data_section = Vec::new();
        let mut offsets = Vec::with_capacity(self.values.len());
        for value in &self.values {
            offsets.push(data_section.len());
            encode(value, &mut data_section);
        }

        let mut out = Vec::with_capacity(node_count * 6 + data_section.len() + 512);
        for node in &self.nodes {
            for record in node {
                let value = match *record {
                    Record::Empty => node_count,
                    Record::Node(next) => next,
                    Record::Data(idx) => node_count + DATA_SECTION_SEPARATOR + offsets[idx],
                };
                assert!(value < 1 << 24, "record does not fit in 24 bits");
                out.extend_from_slice(&(value as u32).to_be_bytes()[1..]);
            }
        }
        out.extend_from_slice(&[0u8; DATA_SECTION_SEPARATOR]);
        out.extend_from_slice(&data_section);

        out.extend_from_slice(METADATA_MARKER);
        let metadata = Value::map(vec![
            ("binary_format_major_version", Value::Uint16(2)),
            ("binary_format_minor_version", Value::Uint16(0)),
            ("build_epoch", Value::Uint64(self.build_epoch)),
            ("database_type", Value::string(&self.database_type)),
            (
                "description",
                Value::map(vec![("en", Value::string("ipinfo test fixture"))]),
            ),
            ("ip_version", Value::Uint16(6)),
            ("languages", Value::Array(vec![Value::string("en")])),
            ("node_count", Value::Uint32(node_count as u32)),
            ("record_size", Value::Uint16(24)),
        ]);
        encode(&metadata, &mut out);
        out
    }

    /// Writes the database to `path`.
    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}

fn write_control(out: &mut Vec<u8>, type_num: u8, size: usize) {
    let (size_bits, extra): (u8, Vec<u8>) = if size < 29 {
        (size as u8, Vec::new())
    } else if size < 285 {
        (29, vec![(size - 29) as u8])
    } else if size < 65_821 {
        (30, ((size - 285) as u16).to_be_bytes().to_vec())
    } else {
        (31, ((size - 65_821) as u32).to_be_bytes()[1..].to_vec())
    };
    if type_num <= 7 {
        out.push((type_num << 5) | size_bits);
    } else {
        out.push(size_bits);
        out.push(type_num - 7);
    }
    out.extend_from_slice(&extra);
}

fn trimmed_be(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

fn encode(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::String(s) => {
            write_control(out, 2, s.len());
            out.extend_from_slice(s.as_bytes());
        }
        Value::Double(d) => {
            write_control(out, 3, 8);
            out.extend_from_slice(&d.to_be_bytes());
        }
        Value::Uint16(v) => {
            let bytes = v.to_be_bytes();
            let payload = trimmed_be(&bytes);
            write_control(out, 5, payload.len());
            out.extend_from_slice(payload);
        }
        Value::Uint32(v) => {
            let bytes = v.to_be_bytes();
            let payload = trimmed_be(&bytes);
            write_control(out, 6, payload.len());
            out.extend_from_slice(payload);
        }
        Value::Map(entries) => {
            write_control(out, 7, entries.len());
            for (key, value) in entries {
                encode(&Value::String(key.clone()), out);
                encode(value, out);
            }
        }
        Value::Uint64(v) => {
            let bytes = v.to_be_bytes();
            let payload = trimmed_be(&bytes);
            write_control(out, 9, payload.len());
            out.extend_from_slice(payload);
        }
        Value::Array(items) => {
            write_control(out, 11, items.len());
            for item in items {
                encode(item, out);
            }
        }
        Value::Bool(b) => write_control(out, 14, usize::from(*b)),
    }
}

/// A GeoLite2-City style record.
pub fn city_record(
    country: &str,
    city: Option<&str>,
    region: Option<&str>,
    location: Option<(f64, f64)>,
    time_zone: Option<&str>,
) -> Value {
    let mut entries = vec![(
        "country",
        Value::map(vec![
            ("iso_code", Value::string(country)),
            ("is_in_european_union", Value::Bool(false)),
            ("geoname_id", Value::Uint32(6_252_001)),
        ]),
    )];
    if let Some(city) = city {
        entries.push((
            "city",
            Value::map(vec![(
                "names",
                Value::map(vec![("en", Value::string(city)), ("de", Value::string(city))]),
            )]),
        ));
    }
    if let Some(region) = region {
        entries.push((
            "subdivisions",
            Value::Array(vec![Value::map(vec![
                ("iso_code", Value::string("XX")),
                ("names", Value::map(vec![("en", Value::string(region))])),
            ])]),
        ));
    }
    let mut loc = vec![("accuracy_radius", Value::Uint16(1000))];
    if let Some((lat, lon)) = location {
        loc.push(("latitude", Value::Double(lat)));
        loc.push(("longitude", Value::Double(lon)));
    }
    if let Some(tz) = time_zone {
        loc.push(("time_zone", Value::string(tz)));
    }
    entries.push(("location", Value::map(loc)));
    Value::map(entries)
}

/// A GeoLite2-ASN style record. `asn == 0` omits the number entirely.
pub fn asn_record(asn: u32, org: &str) -> Value {
    let mut entries = Vec::new();
    if asn != 0 {
        entries.push(("autonomous_system_number", Value::Uint32(asn)));
    }
    if !org.is_empty() {
        entries.push(("autonomous_system_organization", Value::string(org)));
    }
    Value::map(entries)
}

/// City fixture.
///
/// - `10.0.0.0/24`: US, Mountain View, California
/// - `2001:db8::/32`: DE, Berlin, no subdivision
/// - `192.0.2.0/24`: country only, no location
pub fn fixture_city_db() -> Vec<u8> {
    let mut writer = MmdbWriter::new("GeoLite2-City");
    writer
        .insert(
            "10.0.0.0/24",
            city_record(
                "US",
                Some("Mountain View"),
                Some("California"),
                Some((37.386, -122.0838)),
                Some("America/Los_Angeles"),
            ),
        )
        .insert(
            "2001:db8::/32",
            city_record(
                "DE",
                Some("Berlin"),
                None,
                Some((52.52437, 13.41053)),
                Some("Europe/Berlin"),
            ),
        )
        .insert("192.0.2.0/24", city_record("JP", None, None, None, None));
    writer.to_bytes()
}

/// ASN fixture.
///
/// - AS64500 "Example Networks": `10.0.0.0/24`, `2001:db8::/32`
/// - AS64501 with no organization: `192.0.2.0/24`
/// - `198.51.100.0/24`: record without an AS number
pub fn fixture_asn_db() -> Vec<u8> {
    let mut writer = MmdbWriter::new("GeoLite2-ASN");
    writer
        .insert("10.0.0.0/24", asn_record(FIXTURE_ASN, FIXTURE_ORG))
        .insert("2001:db8::/32", asn_record(FIXTURE_ASN, FIXTURE_ORG))
        .insert("192.0.2.0/24", asn_record(SECOND_ASN, ""))
        .insert("198.51.100.0/24", asn_record(0, "Unassigned"));
    writer.to_bytes()
}

/// A city / ASN pair whose country and AS number are tied together.
///
/// Every network of the pair maps to `country` in the city database and to
/// `asn` in the AS database, so a mixed read shows up as a mismatched pairing.
pub fn paired_dbs(country: &str, asn: u32, build_epoch: u64) -> (Vec<u8>, Vec<u8>) {
    let networks = ["10.0.0.0/24", "10.0.1.0/24", "2001:db8::/32"];
    let mut city = MmdbWriter::new("GeoLite2-City").build_epoch(build_epoch);
    let mut asns = MmdbWriter::new("GeoLite2-ASN").build_epoch(build_epoch);
    for network in networks {
        city.insert(network, city_record(country, None, None, None, None));
        asns.insert(network, asn_record(asn, &format!("Org {asn}")));
    }
    (city.to_bytes(), asns.to_bytes())
}
