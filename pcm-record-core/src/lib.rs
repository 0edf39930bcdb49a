//! # pcm-record-core
//!
//! Platform-agnostic real-time PCM capture core.
//!
//! A dedicated worker thread continuously pulls PCM frames from an
//! input device, reconciles each packet's hardware-clock timestamp
//! with wall-clock time, and durably appends the raw samples plus a
//! per-packet timestamp log to two parallel files. Platform backends
//! (e.g. the cpal microphone backend) implement the `CaptureDevice`
//! trait and plug into the generic `Recorder`.
//!
//! ## Architecture
//!
//! ```text
//! pcm-record-core (this crate)
//! ├── traits/       ← CaptureDevice, StreamTimestamp
//! ├── models/       ← RecordConfig, RecordError, SessionState, SessionOutcome
//! ├── capture/      ← CapturePacket, PacketLayout, AudioCapture (full-packet reads)
//! ├── clock         ← FrameClock (frame-position → wall-clock reconciliation)
//! ├── storage/      ← RecordingWriter (raw PCM + timestamp log), JSON sidecar
//! ├── session/      ← Recorder (worker lifecycle, Idle→Starting→Streaming→Stopping)
//! └── bridge/       ← ConnectionStateBridge, Signal/Subscription streams
//! ```

pub mod bridge;
pub mod capture;
pub mod clock;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use bridge::signal::{Signal, Subscription};
pub use bridge::{
    ConnectionState, ConnectionStateBridge, STATUS_COLLECTING, STATUS_DISCONNECTED, STATUS_STOPPED,
};
pub use capture::packet::CapturePacket;
pub use capture::reader::{AudioCapture, PacketLayout, READ_INTERVAL_MICROS};
pub use clock::FrameClock;
pub use models::config::{AudioInput, ChannelConfig, EncodingConfig, RecordConfig, RecordFormat};
pub use models::error::{DeviceErrorCode, RecordError};
pub use models::state::SessionState;
pub use models::summary::{SessionOutcome, SessionSummary};
pub use session::recording::{CancelToken, Recorder, StartRequest};
pub use storage::writer::RecordingWriter;
pub use traits::capture_device::{CaptureDevice, StreamTimestamp};
