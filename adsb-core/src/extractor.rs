//! Per-connection frame extraction.
//!
//! One `FrameExtractor` per receiver connection. Each chunk read from the
//! connection is pushed in; the frames it completes come back out:
//! 1. Append the chunk to the receive buffer
//! 2. Detect the wire format if it is not known yet
//! 3. Walk start markers, scanning and materializing each candidate
//! 4. Compact the buffer down to the bytes after the last complete frame
//!
//! Malformed candidates are dropped silently and counted in the stats.

use serde::Serialize;
use tracing::{debug, trace};

use crate::buffer::ReceiveBuffer;
use crate::detect::{self, Detection, FramingMode};
use crate::frame::ExtractedFrame;
use crate::payload::DropReason;
use crate::scan::{self, Scan};
use crate::types::{self, check_range};

/// Counters for one extractor session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractorStats {
    pub bytes_received: u64,
    pub frames_emitted: u64,
    pub frames_dropped: u64,
    pub bytes_discarded: u64,
    pub resyncs: u64,
}

/// Stateful framing engine for a single byte stream.
///
/// Not shareable between connections; push chunks from one reader only.
#[derive(Debug, Default)]
pub struct FrameExtractor {
    buffer: ReceiveBuffer,
    mode: Option<FramingMode>,
    seen_first_frame: bool,
    /// Buffer offset up to which abandoned candidates have been counted.
    scanned: usize,
    scratch: Vec<u8>,
    stats: ExtractorStats,
}

impl FrameExtractor {
    pub fn new() -> Self {
        FrameExtractor::default()
    }

    /// Framing established for this stream, `None` while still detecting.
    pub fn detected_mode(&self) -> Option<FramingMode> {
        self.mode
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    /// Bytes carried over, waiting for more input.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Push `count` bytes of `bytes` starting at `offset`.
    ///
    /// The only failure is a range that doesn't fit `bytes`; nothing is
    /// consumed in that case.
    pub fn extract(&mut self, bytes: &[u8], offset: usize, count: usize) -> types::Result<Vec<ExtractedFrame>> {
        check_range(offset, count, bytes.len())?;
        Ok(self.push(&bytes[offset..offset + count]))
    }

    /// Push a chunk and collect every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ExtractedFrame> {
        let mut frames = Vec::new();
        self.push_with(chunk, |frame| frames.push(frame));
        frames
    }

    /// Push a chunk, handing each completed frame to `sink` in stream order.
    pub fn push_with<F>(&mut self, chunk: &[u8], mut sink: F)
    where
        F: FnMut(ExtractedFrame),
    {
        self.stats.bytes_received += chunk.len() as u64;
        self.buffer.append(chunk);

        let mode = match self.mode {
            Some(mode) => mode,
            None => match detect::detect(self.buffer.as_slice()) {
                Detection::Detected(mode) => {
                    debug!(%mode, buffered = self.buffer.len(), "detected receiver format");
                    self.mode = Some(mode);
                    mode
                }
                Detection::NeedMore => return,
                Detection::Garbage => {
                    self.scanned = 0;
                    let dropped = self.buffer.clear();
                    self.stats.bytes_discarded += dropped as u64;
                    debug!(dropped, "no format markers found, discarding buffered bytes");
                    return;
                }
            },
        };

        let consumed = self.scan_pass(mode, &mut sink);
        let dropped = self.buffer.compact(consumed);
        if dropped > 0 {
            self.scanned = 0;
            self.stats.bytes_discarded += dropped as u64;
            debug!(%mode, dropped, "unconsumed tail over limit, discarding");
        } else {
            self.scanned = self.scanned.saturating_sub(consumed);
        }
    }

    /// Extract every complete frame in the buffer.
    ///
    /// Returns the offset just past the last complete candidate, 0 if none.
    fn scan_pass<F>(&mut self, mode: FramingMode, sink: &mut F) -> usize
    where
        F: FnMut(ExtractedFrame),
    {
        let buf = self.buffer.as_slice();
        let marker = mode.start_marker();
        let mut pos = 0;
        let mut consumed = 0;

        while let Some(mut start) = scan::find_start(buf, pos, marker) {
            // A single byte ahead of the first start marker usually means we
            // joined mid-frame; don't trust that one
            if !self.seen_first_frame && start == 1 {
                match scan::find_start(buf, start + 1, marker) {
                    Some(next) => start = next,
                    None => break,
                }
            }

            match scan::next_frame(mode, buf, start, &mut self.scratch) {
                Scan::Frame { end } => {
                    self.seen_first_frame = true;
                    consumed = end;
                    pos = end;
                    match ExtractedFrame::mode_s(&self.scratch, mode.has_parity()) {
                        Some(frame) => {
                            self.stats.frames_emitted += 1;
                            sink(frame);
                        }
                        None => {
                            self.stats.frames_dropped += 1;
                            let reason = DropReason::WrongLength(self.scratch.len());
                            trace!(start, %reason, "dropping frame");
                        }
                    }
                }
                Scan::Invalid { end, reason } => {
                    self.seen_first_frame = true;
                    consumed = end;
                    pos = end;
                    self.stats.frames_dropped += 1;
                    trace!(start, %reason, "dropping frame");
                }
                Scan::Abandoned { resume, reason } => {
                    pos = resume;
                    // Abandoned bytes stay buffered and are rescanned on the
                    // next push; count each candidate once
                    if start >= self.scanned {
                        self.scanned = resume;
                        self.stats.frames_dropped += 1;
                        if reason == DropReason::Interrupted {
                            self.stats.resyncs += 1;
                        }
                        trace!(start, %reason, "abandoning candidate");
                    }
                }
                Scan::Incomplete => break,
            }
        }

        consumed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
