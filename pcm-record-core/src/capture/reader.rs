use crate::models::config::RecordConfig;
use crate::models::error::{DeviceErrorCode, RecordError};
use crate::traits::capture_device::{CaptureDevice, StreamTimestamp};

use super::packet::CapturePacket;

/// Nominal packet length: 10 ms of frames per read.
pub const READ_INTERVAL_MICROS: u64 = 10_000;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// Absorbs scheduling jitter between reads: the device buffer holds
/// two packets' worth of frames.
const BUFFER_SIZE_MULTIPLIER: usize = 2;

/// Buffer sizing derived from a config and the driver's reported
/// minimum, computed once before the device opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketLayout {
    /// Size of one frame in bytes: bytes-per-sample × channel count.
    pub bytes_per_frame: usize,
    /// One read interval's worth of frames, rounded up.
    pub packet_bytes: usize,
    /// Device-internal buffer size handed to the driver.
    pub device_buffer_bytes: usize,
}

impl PacketLayout {
    pub fn for_config(config: &RecordConfig, min_buffer_bytes: usize) -> Self {
        let bytes_per_frame =
            bytes_per_sample(config.encoding_bits()) * config.channel_count() as usize;

        // One-shot sizing computation; the only place floating point
        // is permitted in the pipeline.
        let packet_bytes = (bytes_per_frame as f64 * config.sample_rate as f64
            * READ_INTERVAL_MICROS as f64
            / MICROS_PER_SECOND as f64)
            .ceil() as usize;

        let device_buffer_bytes = packet_bytes.max(min_buffer_bytes) * BUFFER_SIZE_MULTIPLIER;

        Self {
            bytes_per_frame,
            packet_bytes,
            device_buffer_bytes,
        }
    }
}

fn bytes_per_sample(encoding_bits: u16) -> usize {
    match encoding_bits {
        8 => 1,
        16 => 2,
        // Reserved for future encodings.
        _ => 4,
    }
}

/// Owns the open input device and guarantees each logical packet is
/// read to completion before being handed downstream.
pub struct AudioCapture<D: CaptureDevice> {
    device: D,
    layout: PacketLayout,
}

impl<D: CaptureDevice> AudioCapture<D> {
    /// Compute the buffer layout and open the device with it.
    pub fn open(mut device: D, config: &RecordConfig) -> Result<Self, RecordError> {
        let min_buffer_bytes = device.min_buffer_bytes(config);
        let layout = PacketLayout::for_config(config, min_buffer_bytes);
        log::debug!(
            "opening capture device: packet {} bytes, device buffer {} bytes (driver min {})",
            layout.packet_bytes,
            layout.device_buffer_bytes,
            min_buffer_bytes
        );
        device.open(config, layout.device_buffer_bytes)?;
        Ok(Self { device, layout })
    }

    pub fn layout(&self) -> &PacketLayout {
        &self.layout
    }

    pub fn request_focus(&mut self) -> Result<(), RecordError> {
        self.device.request_focus()
    }

    pub fn start(&mut self) -> Result<(), RecordError> {
        self.device.start()
    }

    /// Blocking read of exactly one full packet.
    ///
    /// Loops issuing reads into the unfilled region until the packet is
    /// completely full. A zero-length or failed read aborts the packet
    /// with the device error code; the caller owns retry policy. A
    /// successful return means the packet is exactly full, never
    /// partially filled.
    pub fn read_full_packet(&mut self, packet: &mut CapturePacket) -> Result<(), RecordError> {
        while !packet.is_full() {
            let n = self.device.read(packet.remaining_mut())?;
            if n == 0 {
                return Err(RecordError::DeviceRead(DeviceErrorCode::Generic(0)));
            }
            packet.advance(n);
        }
        Ok(())
    }

    /// Fresh driver reference pair for timestamp reconciliation.
    pub fn timestamp(&self) -> Option<StreamTimestamp> {
        self.device.timestamp()
    }

    /// Stop and release the device. Called unconditionally on loop
    /// exit, success or failure.
    pub fn stop(&mut self) {
        self.device.stop();
    }
}
