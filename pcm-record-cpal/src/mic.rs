//! cpal microphone capture device.
//!
//! Opens the system default input device and delivers interleaved
//! little-endian 16-bit PCM through the blocking `CaptureDevice::read`
//! contract. The (non-`Send`) cpal stream lives on a dedicated capture
//! thread; the stream callback stamps a timestamp reference pair and
//! pushes sample bytes into a byte ring sized to the device buffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig, SupportedBufferSize};
use parking_lot::{Condvar, Mutex};

use pcm_record_core::clock;
use pcm_record_core::models::config::RecordConfig;
use pcm_record_core::models::error::{DeviceErrorCode, RecordError};
use pcm_record_core::traits::capture_device::{CaptureDevice, StreamTimestamp};

use crate::ring::ByteRing;

struct Shared {
    ring: Mutex<ByteRing>,
    data_ready: Condvar,
    last_timestamp: Mutex<Option<StreamTimestamp>>,
    stream_failed: AtomicBool,
}

/// Default-microphone capture via cpal.
///
/// Only 16-bit capture is supported: cpal input streams deliver i16 or
/// f32, so an 8-bit config is rejected at `open`.
pub struct CpalMicDevice {
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
    capture_thread: Option<thread::JoinHandle<()>>,
}

impl CpalMicDevice {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                ring: Mutex::new(ByteRing::new(0)),
                data_ready: Condvar::new(),
                last_timestamp: Mutex::new(None),
                stream_failed: AtomicBool::new(false),
            }),
            running: Arc::new(AtomicBool::new(false)),
            capturing: Arc::new(AtomicBool::new(false)),
            capture_thread: None,
        }
    }
}

impl Default for CpalMicDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for CpalMicDevice {
    fn min_buffer_bytes(&self, config: &RecordConfig) -> usize {
        let bytes_per_frame =
            (config.encoding_bits() as usize / 8).max(1) * config.channel_count().max(1) as usize;
        let device = match cpal::default_host().default_input_device() {
            Some(device) => device,
            None => return 0,
        };
        match device.default_input_config() {
            Ok(supported) => match supported.buffer_size() {
                SupportedBufferSize::Range { min, .. } => *min as usize * bytes_per_frame,
                SupportedBufferSize::Unknown => 0,
            },
            Err(_) => 0,
        }
    }

    fn open(&mut self, config: &RecordConfig, buffer_bytes: usize) -> Result<(), RecordError> {
        if self.capture_thread.is_some() {
            return Err(RecordError::Unknown("mic capture already open".into()));
        }
        if config.encoding_bits() != 16 {
            return Err(RecordError::Configuration(format!(
                "cpal backend captures 16-bit PCM only, got {} bits",
                config.encoding_bits()
            )));
        }

        *self.shared.ring.lock() = ByteRing::new(buffer_bytes);
        self.shared.stream_failed.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let running = Arc::clone(&self.running);
        let capturing = Arc::clone(&self.capturing);
        let channels = config.channel_count();
        let sample_rate = config.sample_rate;
        let buffer_frames = (buffer_bytes / (2 * channels.max(1) as usize)) as u32;

        let (init_tx, init_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("cpal-mic-capture".into())
            .spawn(move || {
                capture_thread_main(shared, running, capturing, channels, sample_rate, buffer_frames, init_tx);
            })
            .map_err(|e| RecordError::Unknown(format!("failed to spawn mic thread: {e}")))?;

        self.capture_thread = Some(handle);

        // Wait for the stream to come up before reporting the device open.
        match init_rx.recv() {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => {
                self.running.store(false, Ordering::SeqCst);
                if let Some(handle) = self.capture_thread.take() {
                    let _ = handle.join();
                }
                Err(error)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                if let Some(handle) = self.capture_thread.take() {
                    let _ = handle.join();
                }
                Err(RecordError::Unknown("mic thread exited during init".into()))
            }
        }
    }

    fn start(&mut self) -> Result<(), RecordError> {
        if self.capture_thread.is_none() {
            return Err(RecordError::Unknown("mic capture not open".into()));
        }
        self.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RecordError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut ring = self.shared.ring.lock();
        loop {
            let n = ring.read_into(buf);
            if n > 0 {
                return Ok(n);
            }
            if self.shared.stream_failed.load(Ordering::SeqCst) {
                return Err(RecordError::DeviceRead(DeviceErrorCode::DeadObject));
            }
            if !self.running.load(Ordering::SeqCst) {
                return Err(RecordError::DeviceRead(DeviceErrorCode::InvalidOperation));
            }
            self.shared.data_ready.wait(&mut ring);
        }
    }

    fn timestamp(&self) -> Option<StreamTimestamp> {
        *self.shared.last_timestamp.lock()
    }

    fn stop(&mut self) {
        self.capturing.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.shared.data_ready.notify_all();
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
        }
    }
}

/// Capture thread body: owns the cpal stream for its whole life.
fn capture_thread_main(
    shared: Arc<Shared>,
    running: Arc<AtomicBool>,
    capturing: Arc<AtomicBool>,
    channels: u16,
    sample_rate: u32,
    buffer_frames: u32,
    init_tx: mpsc::Sender<Result<(), RecordError>>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = init_tx.send(Err(RecordError::Unknown("no default input device".into())));
            return;
        }
    };

    if let Ok(name) = device.name() {
        log::debug!("opening input device: {name}");
    }

    // Best effort; an unprivileged process may be refused.
    if let Err(error) =
        thread_priority::set_current_thread_priority(thread_priority::ThreadPriority::Max)
    {
        log::warn!("could not raise audio thread priority: {error:?}");
    }

    let data_shared = Arc::clone(&shared);
    let err_shared = Arc::clone(&shared);
    let mut frames_delivered: i64 = 0;

    let data_fn = move |data: &[i16], _: &cpal::InputCallbackInfo| {
        if !capturing.load(Ordering::Relaxed) {
            return;
        }

        let mut bytes = Vec::with_capacity(data.len() * 2);
        for &sample in data {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        frames_delivered += data.len() as i64 / i64::from(channels.max(1));

        {
            let mut ring = data_shared.ring.lock();
            ring.write(&bytes);
        }
        *data_shared.last_timestamp.lock() = Some(StreamTimestamp {
            frame_position: frames_delivered,
            monotonic_nanos: clock::monotonic_nanos(),
        });
        data_shared.data_ready.notify_all();
    };

    let err_fn = move |error: cpal::StreamError| {
        log::error!("input stream error: {error}");
        err_shared.stream_failed.store(true, Ordering::SeqCst);
        err_shared.data_ready.notify_all();
    };

    let stream_config = StreamConfig {
        channels,
        sample_rate: SampleRate(sample_rate),
        buffer_size: BufferSize::Fixed(buffer_frames),
    };

    // Some hosts reject fixed buffer sizes; fall back to the default.
    let stream = match device.build_input_stream(&stream_config, data_fn.clone(), err_fn.clone(), None) {
        Ok(stream) => stream,
        Err(_) => {
            let fallback = StreamConfig {
                buffer_size: BufferSize::Default,
                ..stream_config
            };
            match device.build_input_stream(&fallback, data_fn, err_fn, None) {
                Ok(stream) => stream,
                Err(error) => {
                    let _ = init_tx.send(Err(RecordError::Configuration(format!(
                        "failed to build input stream: {error}"
                    ))));
                    return;
                }
            }
        }
    };

    if let Err(error) = stream.play() {
        let _ = init_tx.send(Err(RecordError::Unknown(format!(
            "failed to start input stream: {error}"
        ))));
        return;
    }

    let _ = init_tx.send(Ok(()));

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(10));
    }

    drop(stream);
    shared.data_ready.notify_all();
}
