//! Strict `application/x-www-form-urlencoded` decoding
//!
//! Malformed percent escapes, `;` separators and non UTF-8 data are errors
//! rather than being passed through, and repeated keys are kept in order.

use crate::error::FormError;

/// Decoded key/value pairs in the order they appeared
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(Vec<(String, String)>);

impl FormValues {
    /// Parse `a=1&b=2`. Empty segments are skipped and a key without `=`
    /// gets an empty value.
    pub fn parse(input: &str) -> Result<Self, FormError> {
        let mut values = Vec::new();

        for segment in input.split('&') {
            if segment.is_empty() {
                continue;
            }
            if segment.contains(';') {
                return Err(FormError::Semicolon);
            }

            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            values.push((unescape(key)?, unescape(value)?));
        }

        Ok(Self(values))
    }

    /// Append every pair of `other` after the existing ones
    pub fn extend(&mut self, other: FormValues) {
        self.0.extend(other.0);
    }

    /// First value for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode `+` and `%XX`; any other `%` is an error
fn unescape(input: &str) -> Result<String, FormError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hi = bytes.get(i + 1).copied().and_then(hex_value);
                let lo = bytes.get(i + 2).copied().and_then(hex_value);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => {
                        let end = (i + 3).min(bytes.len());
                        let escape = String::from_utf8_lossy(&bytes[i..end]).into_owned();
                        return Err(FormError::InvalidEscape(escape));
                    }
                }
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| FormError::Utf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
