//! Propagation of the external Bluetooth-audio connection signal and
//! the recording-active signal to observers.
//!
//! The bridge is orthogonal to the capture loop: it reacts to signals
//! and drives user-visible status text, but never gates capture.

pub mod signal;

use parking_lot::Mutex;

use self::signal::{Signal, Subscription};

/// External Bluetooth audio connection state, as delivered by the
/// platform's audio subsystem. The device id is informational; nothing
/// in the capture pipeline consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected { device_id: String },
    Disconnected,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// Status text posted while packets are being collected.
pub const STATUS_COLLECTING: &str = "collecting";
/// Status text posted when recording stops or fails.
pub const STATUS_STOPPED: &str = "stopped";
/// Status text posted on a Bluetooth disconnect.
pub const STATUS_DISCONNECTED: &str = "disconnected";

/// Pure reactive mapping from connection/recording transitions to
/// observer streams and status text. The only internal state is the
/// last-seen status text, kept to suppress duplicate postings.
pub struct ConnectionStateBridge {
    bluetooth_connected: Signal<bool>,
    recording_state: Signal<bool>,
    status: Signal<&'static str>,
    last_status: Mutex<Option<&'static str>>,
}

impl ConnectionStateBridge {
    pub fn new() -> Self {
        Self {
            bluetooth_connected: Signal::new(),
            recording_state: Signal::new(),
            status: Signal::new(),
            last_status: Mutex::new(None),
        }
    }

    /// Feed an asynchronous connection state change from the platform.
    pub fn handle_connection_change(&self, state: &ConnectionState) {
        let connected = state.is_connected();
        self.bluetooth_connected.emit(connected);
        if !connected {
            self.post_status(STATUS_DISCONNECTED);
        }
    }

    /// Feed a recording-active transition from the capture worker.
    pub fn set_recording(&self, active: bool) {
        self.recording_state.emit(active);
        self.post_status(if active { STATUS_COLLECTING } else { STATUS_STOPPED });
    }

    pub fn observe_connection(&self) -> Subscription<bool> {
        self.bluetooth_connected.subscribe()
    }

    pub fn observe_recording(&self) -> Subscription<bool> {
        self.recording_state.subscribe()
    }

    pub fn observe_status(&self) -> Subscription<&'static str> {
        self.status.subscribe()
    }

    pub fn last_status(&self) -> Option<&'static str> {
        *self.last_status.lock()
    }

    fn post_status(&self, text: &'static str) {
        let mut last = self.last_status.lock();
        if *last == Some(text) {
            return;
        }
        *last = Some(text);
        self.status.emit(text);
    }
}

impl Default for ConnectionStateBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_transitions_map_to_status_text() {
        let bridge = ConnectionStateBridge::new();
        let status = bridge.observe_status();
        let recording = bridge.observe_recording();

        bridge.set_recording(true);
        bridge.set_recording(false);

        assert_eq!(status.drain(), vec![STATUS_COLLECTING, STATUS_STOPPED]);
        assert_eq!(recording.drain(), vec![true, false]);
        assert_eq!(bridge.last_status(), Some(STATUS_STOPPED));
    }

    #[test]
    fn duplicate_status_is_suppressed() {
        let bridge = ConnectionStateBridge::new();
        let status = bridge.observe_status();

        bridge.set_recording(true);
        bridge.set_recording(true);

        assert_eq!(status.drain(), vec![STATUS_COLLECTING]);
        // The raw bool stream still carries every event.
    }

    #[test]
    fn disconnect_posts_status_but_connect_does_not() {
        let bridge = ConnectionStateBridge::new();
        let status = bridge.observe_status();
        let connection = bridge.observe_connection();

        bridge.handle_connection_change(&ConnectionState::Connected {
            device_id: "hf-audio-01".into(),
        });
        bridge.handle_connection_change(&ConnectionState::Disconnected);

        assert_eq!(connection.drain(), vec![true, false]);
        assert_eq!(status.drain(), vec![STATUS_DISCONNECTED]);
    }
}
