//! Postal-code (CEP) normalization.

/// Strips every character that is not an ASCII digit.
///
/// Used for both the wire request and the cache fingerprint so differently formatted codes
/// (`"01310-100"`, `"01310100"`, `" 01.310-100 "`) are treated as the same address.
pub fn normalize_postal_code(raw: &str) -> String {
	raw.chars().filter(char::is_ascii_digit).collect()
}
