//! Frame output: one line per extracted frame on stdout.

use std::io::{self, Write};

use adsb_core::config::OutputFormat;
use adsb_core::ExtractedFrame;

/// Render one frame as a single line (no trailing newline).
///
/// - `hex`:  `*8D4840D6202CC371C32CE0576098; parity`
/// - `json`: `{"payload":"8D48...","format":"ModeS","has_parity":true,"checksum_failed":false}`
pub fn format_frame(frame: &ExtractedFrame, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Hex => {
            let mut line = format!("*{};", frame.hex());
            if frame.has_parity {
                line.push_str(" parity");
            }
            Ok(line)
        }
        OutputFormat::Json => serde_json::to_string(frame),
    }
}

/// Writes frames to an output stream, optionally stripping parity first.
pub struct FrameWriter<W: Write> {
    out: W,
    format: OutputFormat,
    strip_parity: bool,
    written: u64,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(out: W, format: OutputFormat, strip_parity: bool) -> Self {
        FrameWriter {
            out,
            format,
            strip_parity,
            written: 0,
        }
    }

    pub fn write(&mut self, mut frame: ExtractedFrame) -> io::Result<()> {
        if self.strip_parity {
            frame.strip_parity().map_err(io::Error::other)?;
        }
        let line = format_frame(&frame, self.format)?;
        writeln!(self.out, "{line}")?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
