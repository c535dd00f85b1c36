//! Receive buffer for one connection.
//!
//! Holds bytes that arrived but have not been turned into frames yet. Knows
//! nothing about frame boundaries, only about storage and the discard
//! ceiling applied to leftovers after a scan pass.

/// Leftover bytes beyond this are dropped instead of carried to the next pass.
pub const MAX_UNCONSUMED: usize = 1024;

/// Growable receive buffer with carry-over of unconsumed tail bytes.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    bytes: Vec<u8>,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        ReceiveBuffer { bytes: Vec::new() }
    }

    /// Append a chunk. Grows to exactly the size required.
    pub fn append(&mut self, chunk: &[u8]) {
        self.bytes.reserve_exact(chunk.len());
        self.bytes.extend_from_slice(chunk);
    }

    /// Move everything from `first_unused` onward to the front.
    ///
    /// If more than [`MAX_UNCONSUMED`] bytes would remain they are all
    /// dropped. Returns the number of bytes dropped that way.
    pub fn compact(&mut self, first_unused: usize) -> usize {
        let first_unused = first_unused.min(self.bytes.len());
        let leftover = self.bytes.len() - first_unused;
        if leftover > MAX_UNCONSUMED {
            self.bytes.clear();
            return leftover;
        }
        if first_unused > 0 {
            self.bytes.copy_within(first_unused.., 0);
            self.bytes.truncate(leftover);
        }
        0
    }

    /// Drop every buffered byte. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let len = self.bytes.len();
        self.bytes.clear();
        len
    }

    /// Valid bytes currently held.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
