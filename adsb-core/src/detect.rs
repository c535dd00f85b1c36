//! Wire format detection.
//!
//! Receivers don't announce their framing, so it is inferred from the bytes:
//! - Beast binary: any `0x1A` marker byte settles it immediately
//! - AVR text: after 23 bytes, the first `*`, `:` or `@` picks the variant
//! - 100+ bytes with neither: noise, throw it away and start over

/// Beast frame start / escape byte.
pub const BEAST_ESCAPE: u8 = 0x1A;

/// AVR end-of-frame delimiter.
pub const AVR_END: u8 = b';';

/// Bytes needed before an AVR marker is trusted.
pub const MIN_AVR_DETECT_BYTES: usize = 23;

/// Undetected bytes beyond this are discarded.
pub const MAX_UNDETECTED_BYTES: usize = 100;

/// AVR framing variants, keyed by their start marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiVariant {
    /// `*hex;` with parity
    Parity,
    /// `:hex;` parity already removed by the receiver
    NoParity,
    /// `@` + 12 hex MLAT timestamp + hex + `;`, with parity
    ParityMlat,
}

impl AsciiVariant {
    /// Match a start marker byte.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            b'*' => Some(AsciiVariant::Parity),
            b':' => Some(AsciiVariant::NoParity),
            b'@' => Some(AsciiVariant::ParityMlat),
            _ => None,
        }
    }

    pub fn marker(self) -> u8 {
        match self {
            AsciiVariant::Parity => b'*',
            AsciiVariant::NoParity => b':',
            AsciiVariant::ParityMlat => b'@',
        }
    }

    pub fn has_parity(self) -> bool {
        !matches!(self, AsciiVariant::NoParity)
    }

    pub fn has_mlat_prefix(self) -> bool {
        matches!(self, AsciiVariant::ParityMlat)
    }
}

/// Established framing of a connection. Fixed once detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    Binary,
    Ascii(AsciiVariant),
}

impl FramingMode {
    /// Byte that opens every frame in this mode.
    pub fn start_marker(self) -> u8 {
        match self {
            FramingMode::Binary => BEAST_ESCAPE,
            FramingMode::Ascii(variant) => variant.marker(),
        }
    }

    /// Beast never strips parity; AVR depends on the marker.
    pub fn has_parity(self) -> bool {
        match self {
            FramingMode::Binary => true,
            FramingMode::Ascii(variant) => variant.has_parity(),
        }
    }
}

impl std::fmt::Display for FramingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FramingMode::Binary => write!(f, "beast"),
            FramingMode::Ascii(AsciiVariant::Parity) => write!(f, "avr"),
            FramingMode::Ascii(AsciiVariant::NoParity) => write!(f, "avr-no-parity"),
            FramingMode::Ascii(AsciiVariant::ParityMlat) => write!(f, "avr-mlat"),
        }
    }
}

/// Outcome of one detection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Detected(FramingMode),
    /// Not enough evidence yet, keep the bytes
    NeedMore,
    /// Too many bytes without a marker, discard them
    Garbage,
}

/// Classify buffered bytes.
pub fn detect(buf: &[u8]) -> Detection {
    if buf.contains(&BEAST_ESCAPE) {
        return Detection::Detected(FramingMode::Binary);
    }

    if buf.len() >= MIN_AVR_DETECT_BYTES {
        if let Some(variant) = buf.iter().find_map(|&b| AsciiVariant::from_marker(b)) {
            return Detection::Detected(FramingMode::Ascii(variant));
        }
    }

    if buf.len() > MAX_UNDETECTED_BYTES {
        Detection::Garbage
    } else {
        Detection::NeedMore
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
