//! Frame-position to wall-clock timestamp reconciliation.
//!
//! The hardware clock is monotonic and jitter-free relative to frame
//! delivery but not wall-clock-anchored. The clock is anchored once at
//! session start (monotonic + wall pair) and every packet timestamp is
//! extrapolated from a frame count, avoiding repeated wall-clock reads.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::traits::capture_device::StreamTimestamp;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const NANOS_PER_MILLIS: i64 = 1_000_000;

/// Distinguished "anchor not set" value.
pub const UNINITIALIZED_TIMESTAMP: i64 = i64::MIN;

/// Nanoseconds on the process monotonic clock.
///
/// All `StreamTimestamp` values compared against a `FrameClock` anchor
/// must come from this same timebase.
pub fn monotonic_nanos() -> i64 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = ORIGIN.get_or_init(Instant::now);
    origin.elapsed().as_nanos() as i64
}

fn wall_clock_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Running frame counter plus the session-start anchor pair.
///
/// Once anchored at loop start, the anchor is immutable for the
/// session's lifetime; all timestamps are computed relative to it.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    total_frames_read: u64,
    start_monotonic_nanos: i64,
    start_wall_millis: i64,
}

impl FrameClock {
    /// A clock with no anchor yet. `anchor_now` must be called before
    /// the first timestamp is computed.
    pub fn unanchored() -> Self {
        Self {
            total_frames_read: 0,
            start_monotonic_nanos: UNINITIALIZED_TIMESTAMP,
            start_wall_millis: UNINITIALIZED_TIMESTAMP,
        }
    }

    /// A clock anchored at an explicit monotonic/wall pair.
    pub fn anchored_at(start_monotonic_nanos: i64, start_wall_millis: i64) -> Self {
        Self {
            total_frames_read: 0,
            start_monotonic_nanos,
            start_wall_millis,
        }
    }

    /// Capture the monotonic and wall clocks at the same instant.
    /// Called exactly once, at loop start.
    pub fn anchor_now(&mut self) {
        self.start_monotonic_nanos = monotonic_nanos();
        self.start_wall_millis = wall_clock_millis();
    }

    pub fn is_anchored(&self) -> bool {
        self.start_monotonic_nanos != UNINITIALIZED_TIMESTAMP
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames_read
    }

    /// Advance the frame counter after a packet is durably appended.
    pub fn advance_frames(&mut self, frames: u64) {
        self.total_frames_read += frames;
    }

    /// Map the current frame position to a wall-clock timestamp.
    ///
    /// Uses a fresh driver reference pair when one is available and
    /// falls back silently to `(0, start_monotonic_nanos)` otherwise:
    ///
    /// ```text
    /// frame_nanos = ref_nanos + (frames - ref_frame) * 1e9 / rate
    /// micros      = (frame_nanos - start_nanos) / 1e6 + start_wall_millis
    /// ```
    ///
    /// Integer arithmetic throughout; the i128 intermediate keeps the
    /// frame extrapolation exact over multi-day sessions.
    pub fn timestamp_micros(&self, reference: Option<StreamTimestamp>, sample_rate: u32) -> i64 {
        let (reference_frame, reference_nanos) = match reference {
            Some(ts) => (ts.frame_position, ts.monotonic_nanos),
            None => (0, self.start_monotonic_nanos),
        };

        let frame_delta = self.total_frames_read as i128 - reference_frame as i128;
        let frame_nanos =
            reference_nanos as i128 + frame_delta * NANOS_PER_SECOND as i128 / sample_rate as i128;

        let elapsed_millis = (frame_nanos - self.start_monotonic_nanos as i128)
            / NANOS_PER_MILLIS as i128;
        (elapsed_millis + self.start_wall_millis as i128) as i64
    }
}
