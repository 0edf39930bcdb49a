use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::bridge::ConnectionStateBridge;
use crate::capture::packet::CapturePacket;
use crate::capture::reader::AudioCapture;
use crate::clock::FrameClock;
use crate::models::config::RecordConfig;
use crate::models::error::RecordError;
use crate::models::state::SessionState;
use crate::models::summary::{SessionOutcome, SessionSummary};
use crate::storage::sidecar;
use crate::storage::writer::RecordingWriter;
use crate::traits::capture_device::CaptureDevice;

/// A start-recording request from the controlling layer.
///
/// Both paths must be writable locations in a pre-created directory;
/// the core does not create directories.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub config: RecordConfig,
    pub audio_path: PathBuf,
    pub timestamp_path: PathBuf,
}

/// Cloneable handle over the session liveness flag.
///
/// Cancellation is cooperative: the worker observes the flag only at
/// packet boundaries, never mid-read.
#[derive(Debug, Clone)]
pub struct CancelToken {
    live: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.live.store(false, Ordering::SeqCst);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Owns the recording worker's lifecycle: start, steady-state loop,
/// stop, teardown.
///
/// At most one session is active at a time; a second start request is
/// rejected with `SessionActive` rather than silently replacing the
/// running worker.
pub struct Recorder {
    bridge: Arc<ConnectionStateBridge>,
    state: Arc<Mutex<SessionState>>,
    live: Arc<AtomicBool>,
    worker: Option<thread::JoinHandle<SessionOutcome>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_bridge(Arc::new(ConnectionStateBridge::new()))
    }

    pub fn with_bridge(bridge: Arc<ConnectionStateBridge>) -> Self {
        Self {
            bridge,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            live: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn bridge(&self) -> &Arc<ConnectionStateBridge> {
        &self.bridge
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            live: Arc::clone(&self.live),
        }
    }

    /// Validate the config and spawn the capture worker.
    ///
    /// Configuration errors are reported here, synchronously, before
    /// any device or file handle is opened.
    pub fn start<D: CaptureDevice + 'static>(
        &mut self,
        request: StartRequest,
        device: D,
    ) -> Result<(), RecordError> {
        if self.worker.is_some() {
            return Err(RecordError::SessionActive);
        }
        request
            .config
            .validate()
            .map_err(RecordError::Configuration)?;

        self.live.store(true, Ordering::SeqCst);
        *self.state.lock() = SessionState::Starting;

        let live = Arc::clone(&self.live);
        let state = Arc::clone(&self.state);
        let bridge = Arc::clone(&self.bridge);

        let handle = thread::Builder::new()
            .name("pcm-capture".into())
            .spawn(move || run_session(device, request, live, state, bridge))
            .map_err(|e| {
                self.live.store(false, Ordering::SeqCst);
                *self.state.lock() = SessionState::Idle;
                RecordError::Unknown(format!("failed to spawn capture thread: {e}"))
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    /// Clear the liveness flag and join the worker.
    ///
    /// Blocks until the in-flight packet (if any) completes; the
    /// worker is never preempted mid-read.
    pub fn stop(&mut self) -> Result<SessionOutcome, RecordError> {
        let worker = self.worker.take().ok_or(RecordError::NoSession)?;
        self.live.store(false, Ordering::SeqCst);

        let outcome = worker
            .join()
            .map_err(|_| RecordError::Unknown("capture worker panicked".into()))?;
        *self.state.lock() = SessionState::Idle;
        Ok(outcome)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Recorder {
    /// Dropping an active recorder cancels the session and joins the
    /// worker, so no capture thread outlives its handle.
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.live.store(false, Ordering::SeqCst);
            let _ = worker.join();
            *self.state.lock() = SessionState::Idle;
        }
    }
}

/// The worker body: Starting → Streaming → Stopping.
fn run_session<D: CaptureDevice>(
    device: D,
    request: StartRequest,
    live: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    bridge: Arc<ConnectionStateBridge>,
) -> SessionOutcome {
    let config = &request.config;
    let mut summary = SessionSummary::new(config, &request.audio_path, &request.timestamp_path);
    log::debug!("recording session {} starting: {config}", summary.id);

    // Best effort; an unprivileged process may be refused.
    if let Err(error) =
        thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max)
    {
        log::warn!("could not raise capture thread priority: {error:?}");
    }

    // Output files open before the device does.
    let mut writer = match RecordingWriter::create(&request.audio_path, &request.timestamp_path) {
        Ok(writer) => writer,
        Err(error) => {
            log::error!("session {} failed to open sinks: {error}", summary.id);
            *state.lock() = SessionState::Stopping;
            bridge.set_recording(false);
            return SessionOutcome::Failed { summary, error };
        }
    };

    let mut capture = match AudioCapture::open(device, config) {
        Ok(capture) => capture,
        Err(error) => {
            log::error!("session {} failed to open device: {error}", summary.id);
            *state.lock() = SessionState::Stopping;
            bridge.set_recording(false);
            return SessionOutcome::Failed { summary, error };
        }
    };

    if let Err(error) = capture.request_focus() {
        log::warn!("audio focus not granted, recording anyway: {error}");
    }

    // Anchor once; every timestamp for this session is relative to it.
    let mut clock = FrameClock::unanchored();
    clock.anchor_now();

    let result = capture.start().and_then(|()| {
        *state.lock() = SessionState::Streaming;
        bridge.set_recording(true);
        stream_packets(&mut capture, &mut writer, &mut clock, &live, config.sample_rate)
    });

    *state.lock() = SessionState::Stopping;

    // The device is released on every exit path, success or failure.
    capture.stop();
    bridge.set_recording(false);

    summary.packets_written = writer.packets_written();
    summary.bytes_written = writer.bytes_written();
    summary.frames_read = clock.total_frames();
    summary.checksum = match writer.finish() {
        Ok(checksum) => Some(checksum),
        Err(error) => {
            log::error!("session {} failed to finalize sinks: {error}", summary.id);
            None
        }
    };

    if let Err(error) = sidecar::write_summary(&summary, &request.audio_path) {
        log::error!("session {} failed to write sidecar: {error}", summary.id);
    }

    match result {
        Ok(()) => {
            log::debug!(
                "recording session {} complete: {} packets, {} bytes",
                summary.id,
                summary.packets_written,
                summary.bytes_written
            );
            SessionOutcome::Completed(summary)
        }
        Err(error) => {
            log::error!("recording session {} failed: {error}", summary.id);
            SessionOutcome::Failed { summary, error }
        }
    }
}

/// The steady-state loop: clear packet → blocking full read →
/// reconcile timestamp → append bytes + record → advance frames.
///
/// A failed read is logged and retried without terminating the session;
/// one bad read never silently drops the session. Only a sink failure
/// escapes.
fn stream_packets<D: CaptureDevice>(
    capture: &mut AudioCapture<D>,
    writer: &mut RecordingWriter,
    clock: &mut FrameClock,
    live: &AtomicBool,
    sample_rate: u32,
) -> Result<(), RecordError> {
    let layout = *capture.layout();
    let mut packet = CapturePacket::with_capacity(layout.packet_bytes);

    while live.load(Ordering::SeqCst) {
        packet.clear();
        if let Err(error) = capture.read_full_packet(&mut packet) {
            log::error!("packet read failed, retrying: {error}");
            continue;
        }

        let timestamp_micros = clock.timestamp_micros(capture.timestamp(), sample_rate);
        writer.append_packet(packet.bytes(), timestamp_micros)?;
        clock.advance_frames((packet.len() / layout.bytes_per_frame) as u64);
    }
    Ok(())
}
