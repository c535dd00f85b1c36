//! Frame boundary location inside the receive buffer.

use crate::detect::{AsciiVariant, FramingMode, AVR_END, BEAST_ESCAPE};
use crate::payload::{self, DropReason, Unescape};

/// What the scanner found at a candidate start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Complete frame, payload left in the scratch buffer
    Frame { end: usize },
    /// Complete but unusable frame; its bytes are consumed anyway
    Invalid { end: usize, reason: DropReason },
    /// Candidate given up without a usable end; resume searching at `resume`
    Abandoned { resume: usize, reason: DropReason },
    /// Frame continues past the buffered bytes
    Incomplete,
}

/// Position of the next `marker` at or after `from`.
pub fn find_start(buf: &[u8], from: usize, marker: u8) -> Option<usize> {
    buf.get(from..)?
        .iter()
        .position(|&b| b == marker)
        .map(|i| from + i)
}

/// Scan the candidate frame opening at `start`.
///
/// `buf[start]` must be the start marker of `mode`.
pub fn next_frame(mode: FramingMode, buf: &[u8], start: usize, scratch: &mut Vec<u8>) -> Scan {
    match mode {
        FramingMode::Binary => scan_beast(buf, start, scratch),
        FramingMode::Ascii(variant) => scan_avr(buf, start, variant, scratch),
    }
}

fn scan_beast(buf: &[u8], start: usize, scratch: &mut Vec<u8>) -> Scan {
    let Some(&frame_type) = buf.get(start + 1) else {
        return Scan::Incomplete;
    };

    // A doubled marker is an escaped literal, not a frame start
    if frame_type == BEAST_ESCAPE {
        return Scan::Abandoned {
            resume: start + 2,
            reason: DropReason::UnknownFrameType(frame_type),
        };
    }

    let Some(payload_len) = payload::beast_payload_len(frame_type) else {
        return Scan::Abandoned {
            resume: start + 1,
            reason: DropReason::UnknownFrameType(frame_type),
        };
    };

    match payload::unescape_beast(buf, start + 2, payload_len, scratch) {
        Unescape::Complete { end } => Scan::Frame { end },
        Unescape::Interrupted { at } => Scan::Abandoned {
            resume: at,
            reason: DropReason::Interrupted,
        },
        Unescape::Incomplete => Scan::Incomplete,
    }
}

fn scan_avr(buf: &[u8], start: usize, variant: AsciiVariant, scratch: &mut Vec<u8>) -> Scan {
    let marker = variant.marker();
    let body_start = start + 1;

    for (i, &byte) in buf.iter().enumerate().skip(body_start) {
        if byte == AVR_END {
            let end = i + 1;
            return match payload::decode_avr(&buf[body_start..i], variant, scratch) {
                Ok(()) => Scan::Frame { end },
                Err(reason) => Scan::Invalid { end, reason },
            };
        }
        if byte == marker {
            // Lost terminator; restart at the newer frame
            return Scan::Abandoned {
                resume: i,
                reason: DropReason::Interrupted,
            };
        }
    }

    Scan::Incomplete
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const AVR: FramingMode = FramingMode::Ascii(AsciiVariant::Parity);

    #[test]
    fn test_find_start() {
        assert_eq!(find_start(b"ab*cd*", 0, b'*'), Some(2));
        assert_eq!(find_start(b"ab*cd*", 3, b'*'), Some(5));
        assert_eq!(find_start(b"ab*cd*", 6, b'*'), None);
        assert_eq!(find_start(b"ab", 10, b'*'), None);
    }

    #[test]
    fn test_avr_frame() {
        let buf = b"*5D4840D6202CC3;\r\n";
        let mut scratch = Vec::new();
        assert_eq!(next_frame(AVR, buf, 0, &mut scratch), Scan::Frame { end: 16 });
        assert_eq!(scratch.len(), 7);
    }

    #[test]
    fn test_avr_incomplete() {
        let mut scratch = Vec::new();
        assert_eq!(next_frame(AVR, b"*5D4840", 0, &mut scratch), Scan::Incomplete);
        assert_eq!(next_frame(AVR, b"*", 0, &mut scratch), Scan::Incomplete);
    }

    #[test]
    fn test_avr_invalid_is_consumed() {
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(AVR, b"*5D48G0;*", 0, &mut scratch),
            Scan::Invalid {
                end: 8,
                reason: DropReason::BadHex
            }
        );
    }

    #[test]
    fn test_avr_lost_terminator() {
        let buf = b"*5D4840*5D4840D6202CC3;";
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(AVR, buf, 0, &mut scratch),
            Scan::Abandoned {
                resume: 7,
                reason: DropReason::Interrupted
            }
        );
        assert_eq!(next_frame(AVR, buf, 7, &mut scratch), Scan::Frame { end: 23 });
    }

    #[test]
    fn test_avr_other_markers_are_noise() {
        // ':' inside a '*' stream is just a bad character
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(AVR, b"*5D48:0D6202CC3;", 0, &mut scratch),
            Scan::Invalid {
                end: 16,
                reason: DropReason::BadHex
            }
        );
    }

    #[test]
    fn test_beast_frame() {
        let mut buf = vec![0x1A, b'2', 0, 0, 0, 0, 0, 0, 0xFF];
        buf.extend_from_slice(&[0x5D, 0x48, 0x40, 0xD6, 0x20, 0x2C, 0xC3]);
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(FramingMode::Binary, &buf, 0, &mut scratch),
            Scan::Frame { end: 16 }
        );
        assert_eq!(scratch, vec![0x5D, 0x48, 0x40, 0xD6, 0x20, 0x2C, 0xC3]);
    }

    #[test]
    fn test_beast_unknown_type() {
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(FramingMode::Binary, &[0x1A, b'9', 0, 0], 0, &mut scratch),
            Scan::Abandoned {
                resume: 1,
                reason: DropReason::UnknownFrameType(b'9')
            }
        );
        assert_eq!(
            next_frame(FramingMode::Binary, &[0x1A, 0x1A, 0, 0], 0, &mut scratch),
            Scan::Abandoned {
                resume: 2,
                reason: DropReason::UnknownFrameType(0x1A)
            }
        );
    }

    #[test]
    fn test_beast_incomplete() {
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(FramingMode::Binary, &[0x1A], 0, &mut scratch),
            Scan::Incomplete
        );
        assert_eq!(
            next_frame(FramingMode::Binary, &[0x1A, b'3', 0, 0, 0], 0, &mut scratch),
            Scan::Incomplete
        );
    }

    #[test]
    fn test_beast_interrupted() {
        let buf = [0x1A, b'3', 0, 0, 0, 0x1A, b'2', 0];
        let mut scratch = Vec::new();
        assert_eq!(
            next_frame(FramingMode::Binary, &buf, 0, &mut scratch),
            Scan::Abandoned {
                resume: 5,
                reason: DropReason::Interrupted
            }
        );
    }
}
