//! # pcm-record-cpal
//!
//! Cross-platform microphone backend for pcm-record-kit.
//!
//! Provides:
//! - `CpalMicDevice`: default-microphone capture via cpal, adapting
//!   cpal's callback delivery to the core's blocking `CaptureDevice`
//!   read contract
//! - `ByteRing`: circular byte buffer between the audio callback and
//!   the blocking reader
//!
//! ## Usage
//! ```ignore
//! use pcm_record_core::{Recorder, RecordConfig, StartRequest};
//! use pcm_record_cpal::CpalMicDevice;
//!
//! let mut recorder = Recorder::new();
//! recorder.start(
//!     StartRequest {
//!         config: RecordConfig::default(),
//!         audio_path: "/data/capture/session.pcm".into(),
//!         timestamp_path: "/data/capture/session.ts".into(),
//!     },
//!     CpalMicDevice::new(),
//! )?;
//! ```

pub mod mic;
pub mod ring;

pub use mic::CpalMicDevice;
pub use ring::ByteRing;
