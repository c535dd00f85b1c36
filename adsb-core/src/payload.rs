//! Payload materialization: raw frame bytes to canonical Mode S bytes.
//!
//! Beast frames are unescaped while they are scanned, since their end is
//! only known once enough unescaped bytes have been counted. AVR frames are
//! located by their `;` first and then decoded from hex pairs here.

use crate::detect::{AsciiVariant, BEAST_ESCAPE};
use crate::types::hex_digit;

/// Beast header ahead of the payload: 6-byte MLAT counter + 1 signal byte.
pub const BEAST_HEADER_BYTES: usize = 7;

/// AVR MLAT timestamp prefix, in hex characters.
pub const MLAT_PREFIX_CHARS: usize = 12;

/// Why a located candidate produced no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Beast type selector other than `'1'`, `'2'` or `'3'`
    UnknownFrameType(u8),
    /// A new start marker showed up before the candidate was complete
    Interrupted,
    /// Non-hex character in an AVR body
    BadHex,
    /// Odd number of hex characters in an AVR body
    OddLength,
    /// AVR MLAT timestamp missing or not hex
    BadMlatPrefix,
    /// Decoded fine, but not 7 or 14 bytes
    WrongLength(usize),
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::UnknownFrameType(t) => write!(f, "unknown beast frame type 0x{t:02X}"),
            DropReason::Interrupted => write!(f, "interrupted by start marker"),
            DropReason::BadHex => write!(f, "non-hex character"),
            DropReason::OddLength => write!(f, "odd number of hex digits"),
            DropReason::BadMlatPrefix => write!(f, "bad MLAT prefix"),
            DropReason::WrongLength(n) => write!(f, "unusable payload length {n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Beast binary
// ---------------------------------------------------------------------------

/// Payload length announced by a Beast type selector.
pub fn beast_payload_len(frame_type: u8) -> Option<usize> {
    match frame_type {
        b'1' => Some(2),  // Mode A/C
        b'2' => Some(7),  // Mode S short
        b'3' => Some(14), // Mode S long
        _ => None,
    }
}

/// Result of unescaping one Beast frame body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unescape {
    /// Payload is in the scratch buffer; `end` is one past the frame's last byte
    Complete { end: usize },
    /// Lone escape byte at `at`, i.e. the start of another frame
    Interrupted { at: usize },
    /// Ran out of buffered bytes
    Incomplete,
}

/// Unescape header + `payload_len` bytes starting at `from`.
///
/// `0x1A 0x1A` stands for one literal `0x1A`. Header bytes are skipped, the
/// payload bytes are written to `scratch`.
pub fn unescape_beast(buf: &[u8], from: usize, payload_len: usize, scratch: &mut Vec<u8>) -> Unescape {
    scratch.clear();
    let total = BEAST_HEADER_BYTES + payload_len;
    let mut pos = from;
    let mut count = 0;

    while count < total {
        let Some(&byte) = buf.get(pos) else {
            return Unescape::Incomplete;
        };
        if byte == BEAST_ESCAPE {
            match buf.get(pos + 1) {
                None => return Unescape::Incomplete,
                Some(&BEAST_ESCAPE) => pos += 2,
                Some(_) => return Unescape::Interrupted { at: pos },
            }
        } else {
            pos += 1;
        }
        if count >= BEAST_HEADER_BYTES {
            scratch.push(byte);
        }
        count += 1;
    }

    Unescape::Complete { end: pos }
}

// ---------------------------------------------------------------------------
// AVR text
// ---------------------------------------------------------------------------

/// Decode the characters between an AVR start marker and its `;`.
pub fn decode_avr(body: &[u8], variant: AsciiVariant, scratch: &mut Vec<u8>) -> Result<(), DropReason> {
    scratch.clear();

    let hex = if variant.has_mlat_prefix() {
        if body.len() < MLAT_PREFIX_CHARS
            || !body[..MLAT_PREFIX_CHARS].iter().all(u8::is_ascii_hexdigit)
        {
            return Err(DropReason::BadMlatPrefix);
        }
        &body[MLAT_PREFIX_CHARS..]
    } else {
        body
    };

    if !hex.len().is_multiple_of(2) {
        return Err(DropReason::OddLength);
    }
    for pair in hex.chunks_exact(2) {
        let high = hex_digit(pair[0]).ok_or(DropReason::BadHex)?;
        let low = hex_digit(pair[1]).ok_or(DropReason::BadHex)?;
        scratch.push((high << 4) | low);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
