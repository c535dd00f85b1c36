//! Shared error enum and hex helpers for adsb-core.

use thiserror::Error;

/// All errors produced by adsb-core.
///
/// Framing noise never shows up here. Only caller contract violations,
/// I/O and configuration problems are reported as errors.
#[derive(Debug, Error)]
pub enum AdsbError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("range out of bounds: offset {offset} + length {length} exceeds {available} bytes")]
    OutOfBounds {
        offset: usize,
        length: usize,
        available: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AdsbError>;

/// Validate that `offset..offset + length` lies inside a buffer of `available` bytes.
pub(crate) fn check_range(offset: usize, length: usize, available: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= available => Ok(()),
        _ => Err(AdsbError::OutOfBounds {
            offset,
            length,
            available,
        }),
    }
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    let invalid = || AdsbError::InvalidHex(hex.to_string());
    if !hex.len().is_multiple_of(2) {
        return Err(invalid());
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        let high = hex_digit(chunk[0]).ok_or_else(invalid)?;
        let low = hex_digit(chunk[1]).ok_or_else(invalid)?;
        bytes.push((high << 4) | low);
    }
    Ok(bytes)
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

/// Value of one ASCII hex digit, `None` for anything else.
pub(crate) fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decode() {
        assert_eq!(hex_decode("4840D6").unwrap(), vec![0x48, 0x40, 0xD6]);
        assert_eq!(hex_decode("4840d6").unwrap(), vec![0x48, 0x40, 0xD6]);
        assert!(matches!(hex_decode("odd"), Err(AdsbError::InvalidHex(_))));
        assert!(matches!(hex_decode("ZZZZ"), Err(AdsbError::InvalidHex(_))));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode(&[0x48, 0x40, 0xD6]), "4840D6");
        assert_eq!(hex_encode(&[]), "");
    }

    #[test]
    fn test_check_range() {
        assert!(check_range(0, 14, 14).is_ok());
        assert!(check_range(4, 10, 14).is_ok());
        assert!(check_range(14, 0, 14).is_ok());
        assert!(matches!(
            check_range(5, 10, 14),
            Err(AdsbError::OutOfBounds {
                offset: 5,
                length: 10,
                available: 14
            })
        ));
        assert!(check_range(usize::MAX, 2, 14).is_err());
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = check_range(3, 20, 7).unwrap_err();
        assert_eq!(
            err.to_string(),
            "range out of bounds: offset 3 + length 20 exceeds 7 bytes"
        );
    }
}
