/// Circular byte buffer between the audio callback and the blocking
/// reader.
///
/// Wrap in `Arc<parking_lot::Mutex<ByteRing>>` for cross-thread
/// access. Overflow drops the oldest bytes, the same thing the
/// hardware does on a driver overrun.
#[derive(Debug)]
pub struct ByteRing {
    buffer: Vec<u8>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
}

impl ByteRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
        }
    }

    /// Write bytes into the ring.
    ///
    /// If the ring overflows, the oldest bytes are dropped. If `bytes`
    /// is larger than capacity, only the last `capacity` bytes are kept.
    pub fn write(&mut self, bytes: &[u8]) {
        if bytes.is_empty() || self.capacity == 0 {
            return;
        }

        let bytes = if bytes.len() > self.capacity {
            &bytes[bytes.len() - self.capacity..]
        } else {
            bytes
        };

        let overflow = (self.available + bytes.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.read_index = (self.read_index + overflow) % self.capacity;
            self.available -= overflow;
        }

        for &b in bytes {
            self.buffer[self.write_index] = b;
            self.write_index = (self.write_index + 1) % self.capacity;
        }
        self.available += bytes.len();
    }

    /// Read and remove up to `out.len()` bytes into `out`, returning
    /// how many were copied.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let to_read = out.len().min(self.available);
        for slot in out.iter_mut().take(to_read) {
            *slot = self.buffer[self.read_index];
            self.read_index = (self.read_index + 1) % self.capacity;
        }
        self.available -= to_read;
        to_read
    }

    /// Number of bytes currently available for reading.
    pub fn count(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
