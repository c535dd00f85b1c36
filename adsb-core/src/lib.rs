//! adsb-core: Pure framing library for Mode S receiver feeds.
//!
//! No async, no I/O — just byte-stream algorithms. Turns the raw output of a
//! Beast or AVR receiver, delivered in arbitrary chunks, into 7- and 14-byte
//! Mode S payloads. `adsb-feeder` supplies the bytes.

pub mod buffer;
pub mod config;
pub mod crc;
pub mod detect;
pub mod extractor;
pub mod frame;
pub mod parity;
pub mod payload;
pub mod scan;
pub mod types;

// Re-export commonly used types at crate root
pub use detect::{AsciiVariant, FramingMode};
pub use extractor::{ExtractorStats, FrameExtractor};
pub use frame::{ExtractedFrame, PayloadFormat};
pub use parity::strip_parity;
pub use types::*;
