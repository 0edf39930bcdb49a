/// Fixed-capacity byte buffer holding one read interval's worth of
/// frames.
///
/// Reused across loop iterations: `clear` resets the fill position
/// without touching the allocation, so the steady-state loop does no
/// per-iteration allocation.
#[derive(Debug)]
pub struct CapturePacket {
    buf: Vec<u8>,
    filled: usize,
}

impl CapturePacket {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            filled: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.filled
    }

    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// Reset the fill position. The capacity is untouched.
    pub fn clear(&mut self) {
        self.filled = 0;
    }

    /// The unfilled tail region, for the next read to land in.
    pub fn remaining_mut(&mut self) -> &mut [u8] {
        let filled = self.filled;
        &mut self.buf[filled..]
    }

    /// Mark `n` more bytes as filled after a successful read.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.filled + n <= self.buf.len());
        self.filled = (self.filled + n).min(self.buf.len());
    }

    /// The filled prefix, ready for appending to a sink.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.filled]
    }
}
