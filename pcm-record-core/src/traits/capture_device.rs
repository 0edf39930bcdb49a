use crate::models::config::RecordConfig;
use crate::models::error::RecordError;

/// A hardware reference pair: "frame number `frame_position` was
/// delivered at `monotonic_nanos` on the process monotonic clock".
///
/// Backends must report `monotonic_nanos` in the timebase of
/// [`crate::clock::monotonic_nanos`] so it can be compared against the
/// session-start anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTimestamp {
    pub frame_position: i64,
    pub monotonic_nanos: i64,
}

/// Interface for platform-specific PCM input devices.
///
/// Lifecycle, driven by the recording loop:
/// `min_buffer_bytes` → `open` → `request_focus` → `start` →
/// `read`* → `stop`. `stop` is called unconditionally on every loop
/// exit path so the hardware handle is never leaked.
pub trait CaptureDevice: Send {
    /// Platform-reported minimum driver buffer size in bytes for the
    /// given config. Used as a floor for the device buffer sizing.
    fn min_buffer_bytes(&self, config: &RecordConfig) -> usize;

    /// Open the device with an internal buffer of `buffer_bytes`.
    fn open(&mut self, config: &RecordConfig, buffer_bytes: usize) -> Result<(), RecordError>;

    /// Request audio focus ahead of capture. Denial is non-fatal: the
    /// caller logs a warning and records anyway.
    fn request_focus(&mut self) -> Result<(), RecordError> {
        Ok(())
    }

    /// Begin delivering frames. Issued immediately before the loop.
    fn start(&mut self) -> Result<(), RecordError>;

    /// Blocking read into `buf`. Returns the number of bytes read,
    /// which may be less than `buf.len()`; the caller loops until its
    /// packet is full. A zero-length return or an error aborts the
    /// packet with the device error code attached.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RecordError>;

    /// Fresh `(frame_position, monotonic_nanos)` reference pair, or
    /// `None` when the driver cannot provide one. A failed query must
    /// not abort the packet; the clock falls back to its session-start
    /// anchor.
    fn timestamp(&self) -> Option<StreamTimestamp>;

    /// Stop capturing and release the hardware handle. Infallible:
    /// teardown has no caller that could recover.
    fn stop(&mut self);
}
