//! Scripted in-memory capture device for unit and scenario tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::models::config::RecordConfig;
use crate::models::error::{DeviceErrorCode, RecordError};
use crate::traits::capture_device::{CaptureDevice, StreamTimestamp};

pub(crate) enum Step {
    /// One successful read delivering exactly these bytes.
    Chunk(Vec<u8>),
    /// One failed read carrying this device code.
    Fail(DeviceErrorCode),
}

/// Plays back a fixed script of reads, recording lifecycle calls so
/// tests can assert the device was started and released.
///
/// When the script runs out, the `on_exhausted` hook fires (tests use
/// it to cancel the session) and every further read fails with
/// `DeadObject`.
pub(crate) struct ScriptedDevice {
    steps: VecDeque<Step>,
    min_buffer: usize,
    opened_with: Arc<AtomicUsize>,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    timestamp: Option<StreamTimestamp>,
    deny_focus: bool,
    on_exhausted: Option<Box<dyn FnMut() + Send>>,
}

impl ScriptedDevice {
    pub(crate) fn new(min_buffer: usize) -> Self {
        Self {
            steps: VecDeque::new(),
            min_buffer,
            opened_with: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
            timestamp: None,
            deny_focus: false,
            on_exhausted: None,
        }
    }

    pub(crate) fn push_chunk(&mut self, bytes: Vec<u8>) {
        self.steps.push_back(Step::Chunk(bytes));
    }

    pub(crate) fn push_fail(&mut self, code: DeviceErrorCode) {
        self.steps.push_back(Step::Fail(code));
    }

    pub(crate) fn set_timestamp(&mut self, timestamp: StreamTimestamp) {
        self.timestamp = Some(timestamp);
    }

    pub(crate) fn deny_focus(&mut self) {
        self.deny_focus = true;
    }

    /// Hook invoked each time a read finds the script empty.
    pub(crate) fn on_exhausted(&mut self, hook: impl FnMut() + Send + 'static) {
        self.on_exhausted = Some(Box::new(hook));
    }

    pub(crate) fn opened_with(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.opened_with)
    }

    pub(crate) fn started_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.started)
    }

    pub(crate) fn stopped_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }
}

impl CaptureDevice for ScriptedDevice {
    fn min_buffer_bytes(&self, _config: &RecordConfig) -> usize {
        self.min_buffer
    }

    fn open(&mut self, _config: &RecordConfig, buffer_bytes: usize) -> Result<(), RecordError> {
        self.opened_with.store(buffer_bytes, Ordering::SeqCst);
        Ok(())
    }

    fn request_focus(&mut self) -> Result<(), RecordError> {
        if self.deny_focus {
            Err(RecordError::FocusDenied)
        } else {
            Ok(())
        }
    }

    fn start(&mut self) -> Result<(), RecordError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RecordError> {
        match self.steps.pop_front() {
            Some(Step::Chunk(bytes)) => {
                assert!(
                    bytes.len() <= buf.len(),
                    "scripted chunk larger than the unfilled packet region"
                );
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            Some(Step::Fail(code)) => Err(RecordError::DeviceRead(code)),
            None => {
                if let Some(hook) = self.on_exhausted.as_mut() {
                    hook();
                }
                Err(RecordError::DeviceRead(DeviceErrorCode::DeadObject))
            }
        }
    }

    fn timestamp(&self) -> Option<StreamTimestamp> {
        self.timestamp
    }

    fn stop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}
