//! Extracted Mode S payloads, the output record of the framing engine.

use serde::{Serialize, Serializer};

use crate::parity;
use crate::types::{hex_encode, Result};

/// Short Mode S frame: 56 bits.
pub const SHORT_FRAME_BYTES: usize = 7;
/// Long Mode S frame: 112 bits.
pub const LONG_FRAME_BYTES: usize = 14;

/// Kind of payload carried by an [`ExtractedFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PayloadFormat {
    ModeS,
}

/// One Mode S payload pulled out of a receiver byte stream.
///
/// Owns its bytes; nothing here borrows from the extractor's receive buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFrame {
    /// 7 or 14 bytes, never anything else
    #[serde(serialize_with = "serialize_hex")]
    pub payload: Vec<u8>,
    pub format: PayloadFormat,
    /// Payload still carries its AP/PI field and needs parity stripping
    /// before the address bits can be trusted.
    pub has_parity: bool,
    /// Left for downstream checksum validation. The extractor never sets it.
    pub checksum_failed: bool,
}

impl ExtractedFrame {
    /// Build a Mode S frame from a decoded payload.
    ///
    /// Returns `None` unless `payload` is exactly 7 or 14 bytes.
    pub fn mode_s(payload: &[u8], has_parity: bool) -> Option<Self> {
        if !is_mode_s_length(payload.len()) {
            return None;
        }
        Some(ExtractedFrame {
            payload: payload.to_vec(),
            format: PayloadFormat::ModeS,
            has_parity,
            checksum_failed: false,
        })
    }

    /// True if this is a 112-bit (long) message.
    pub fn is_long(&self) -> bool {
        self.payload.len() == LONG_FRAME_BYTES
    }

    /// Downlink Format (first 5 bits), 0 for an empty payload.
    pub fn df(&self) -> u8 {
        self.payload.first().map_or(0, |b| (b >> 3) & 0x1F)
    }

    /// Payload as uppercase hex, the same text an AVR feed would carry.
    pub fn hex(&self) -> String {
        hex_encode(&self.payload)
    }

    /// Remove the parity field in place and clear `has_parity`.
    ///
    /// No-op for frames that arrived without parity.
    pub fn strip_parity(&mut self) -> Result<()> {
        if self.has_parity {
            let len = self.payload.len();
            parity::strip_parity(&mut self.payload, 0, len)?;
            self.has_parity = false;
        }
        Ok(())
    }
}

/// 7 and 14 are the only lengths the extractor emits.
pub fn is_mode_s_length(len: usize) -> bool {
    len == SHORT_FRAME_BYTES || len == LONG_FRAME_BYTES
}

fn serialize_hex<S: Serializer>(payload: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex_encode(payload))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hex_decode;

    #[test]
    fn test_mode_s_lengths() {
        assert!(ExtractedFrame::mode_s(&[0u8; 7], true).is_some());
        assert!(ExtractedFrame::mode_s(&[0u8; 14], true).is_some());
        assert!(ExtractedFrame::mode_s(&[0u8; 2], true).is_none());
        assert!(ExtractedFrame::mode_s(&[0u8; 13], false).is_none());
        assert!(ExtractedFrame::mode_s(&[], false).is_none());
    }

    #[test]
    fn test_new_frame_flags() {
        let frame = ExtractedFrame::mode_s(&[0x5D, 0, 0, 0, 0, 0, 0], false).unwrap();
        assert_eq!(frame.format, PayloadFormat::ModeS);
        assert!(!frame.has_parity);
        assert!(!frame.checksum_failed);
        assert!(!frame.is_long());
        assert_eq!(frame.df(), 11);
    }

    #[test]
    fn test_hex_and_df() {
        let raw = hex_decode("8D4840D6202CC371C32CE0576098").unwrap();
        let frame = ExtractedFrame::mode_s(&raw, true).unwrap();
        assert_eq!(frame.hex(), "8D4840D6202CC371C32CE0576098");
        assert_eq!(frame.df(), 17);
        assert!(frame.is_long());
    }

    #[test]
    fn test_df_empty_payload() {
        let frame = ExtractedFrame {
            payload: Vec::new(),
            format: PayloadFormat::ModeS,
            has_parity: false,
            checksum_failed: false,
        };
        assert_eq!(frame.df(), 0);
    }

    #[test]
    fn test_strip_parity_clears_flag() {
        let raw = hex_decode("8D4840D6202CC371C32CE0576098").unwrap();
        let mut frame = ExtractedFrame::mode_s(&raw, true).unwrap();
        frame.strip_parity().unwrap();
        assert!(!frame.has_parity);
        assert_eq!(&frame.payload[11..], &[0, 0, 0]);

        // Second call leaves the payload alone
        let before = frame.payload.clone();
        frame.strip_parity().unwrap();
        assert_eq!(frame.payload, before);
    }
}
