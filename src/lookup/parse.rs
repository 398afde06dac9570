//! AS number parsing.

use crate::error_handling::LookupError;

/// Parses user-supplied AS number text.
///
/// Accepts `15169`, `AS15169`, `ASN15169` in any letter case, with surrounding
/// slashes and spaces. Zero is not a valid AS number.
///
/// # Errors
///
/// Returns `LookupError::InvalidAsn` with the original text.
///
/// # Examples
///
/// ```
/// use ipinfo::parse_asn;
///
/// assert_eq!(parse_asn("AS15169"), Ok(15169));
/// assert_eq!(parse_asn("/asn15169/"), Ok(15169));
/// assert!(parse_asn("AS0").is_err());
/// ```
pub fn parse_asn(text: &str) -> Result<u32, LookupError> {
    let invalid = || LookupError::InvalidAsn(text.to_string());

    let trimmed = text.trim_matches(|c| c == '/' || c == ' ');
    let upper = trimmed.to_ascii_uppercase();
    let digits = if upper.starts_with("ASN") {
        &trimmed[3..]
    } else if upper.starts_with("AS") {
        &trimmed[2..]
    } else {
        trimmed
    };
    let digits = digits.trim_matches(|c| c == '/' || c == ' ');

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(asn) => Ok(asn),
    }
}
