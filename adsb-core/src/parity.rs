//! Mode S parity removal.
//!
//! Payloads that still carry their AP/PI field have the CRC of the preceding
//! bytes XOR'd into the last 3 bytes. Stripping recomputes that CRC and XORs
//! it back out, leaving the residual in place: all zeroes for a clean DF17/18
//! (or the interrogator code for DF11), the ICAO address for DF0/4/5/16/20/21.

use crate::crc;
use crate::types::{check_range, AdsbError, Result};

/// Width of the parity field in bytes.
pub const PARITY_BYTES: usize = 3;

/// Strip parity from the `length` bytes of `bytes` starting at `offset`.
///
/// Fails with [`AdsbError::OutOfBounds`] when the view does not fit inside
/// `bytes` or is too short to hold a parity field.
pub fn strip_parity(bytes: &mut [u8], offset: usize, length: usize) -> Result<()> {
    check_range(offset, length, bytes.len())?;
    if length < PARITY_BYTES {
        return Err(AdsbError::OutOfBounds {
            offset,
            length,
            available: bytes.len(),
        });
    }

    let view = &mut bytes[offset..offset + length];
    let parity = crc::crc24_payload(view);
    let tail = length - PARITY_BYTES;
    view[tail] ^= (parity >> 16) as u8;
    view[tail + 1] ^= (parity >> 8) as u8;
    view[tail + 2] ^= parity as u8;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
