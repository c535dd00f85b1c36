//! Byte sources for receiver feeds.
//!
//! Input modes:
//! - `replay`: a recorded capture file or stdin, read synchronously
//! - `pump`:   a live TCP connection (or any async reader)
//!
//! Both hand every read, whatever its size, to a single `FrameExtractor`.
//! One extractor per source; never share one between connections.

use std::io::{self, Read};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use adsb_core::{ExtractedFrame, FrameExtractor};

/// Read `reader` to EOF in `chunk_size` reads, passing each frame to `on_frame`.
///
/// Returns the number of bytes read.
pub fn replay<R, F>(
    mut reader: R,
    extractor: &mut FrameExtractor,
    chunk_size: usize,
    mut on_frame: F,
) -> io::Result<u64>
where
    R: Read,
    F: FnMut(ExtractedFrame) -> io::Result<()>,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        total += n as u64;
        for frame in extractor.push(&buf[..n]) {
            on_frame(frame)?;
        }
    }

    debug!(bytes = total, "replay reached end of input");
    Ok(total)
}

/// Async counterpart of [`replay`] for sockets.
pub async fn pump<R, F>(
    mut reader: R,
    extractor: &mut FrameExtractor,
    chunk_size: usize,
    mut on_frame: F,
) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    F: FnMut(ExtractedFrame) -> io::Result<()>,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
        for frame in extractor.push(&buf[..n]) {
            on_frame(frame)?;
        }
    }

    debug!(bytes = total, "connection closed by peer");
    Ok(total)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use adsb_core::types::hex_decode;
    use adsb_core::FramingMode;

    const FRAMES: &[&str] = &[
        "8D4840D6202CC371C32CE0576098",
        "5D4840D6202CC3",
        "8D40621D58C382D690C8AC2863A7",
    ];

    fn beast_capture() -> Vec<u8> {
        let mut out = Vec::new();
        for hex in FRAMES {
            let payload = hex_decode(hex).unwrap();
            out.push(0x1A);
            out.push(if payload.len() == 14 { b'3' } else { b'2' });
            for &b in [0x00, 0x1A, 0x02, 0x03, 0x04, 0x05, 0x90].iter().chain(&payload) {
                out.push(b);
                if b == 0x1A {
                    out.push(0x1A);
                }
            }
        }
        out
    }

    #[test]
    fn test_replay_file_small_chunks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&beast_capture()).unwrap();
        file.flush().unwrap();

        let reader = std::fs::File::open(file.path()).unwrap();
        let mut extractor = FrameExtractor::new();
        let mut seen = Vec::new();
        let total = replay(reader, &mut extractor, 5, |f| {
            seen.push(f.hex());
            Ok(())
        })
        .unwrap();

        assert_eq!(total, beast_capture().len() as u64);
        assert_eq!(seen, FRAMES);
        assert_eq!(extractor.detected_mode(), Some(FramingMode::Binary));
    }

    #[test]
    fn test_replay_avr_text() {
        let text = FRAMES.iter().map(|h| format!("*{h};\n")).collect::<String>();
        let mut extractor = FrameExtractor::new();
        let mut seen = Vec::new();
        replay(text.as_bytes(), &mut extractor, 7, |f| {
            seen.push(f.hex());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, FRAMES);
    }

    #[test]
    fn test_replay_stops_on_sink_error() {
        let mut extractor = FrameExtractor::new();
        let capture = beast_capture();
        let result = replay(capture.as_slice(), &mut extractor, 4096, |_| {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_pump_async_reader() {
        let capture = beast_capture();
        let mut extractor = FrameExtractor::new();
        let mut seen = Vec::new();
        let total = pump(capture.as_slice(), &mut extractor, 3, |f| {
            seen.push(f.hex());
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(total, capture.len() as u64);
        assert_eq!(seen, FRAMES);
    }
}
