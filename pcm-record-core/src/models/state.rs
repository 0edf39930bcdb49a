/// Recording session state machine.
///
/// State transitions:
/// ```text
/// idle → starting → streaming → stopping → idle
///            ↓                      ↑
///            └──── (start failed) ──┘
/// ```
///
/// `Stopping` never re-enters `Streaming`; `Idle` is reused for the
/// next session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No device open, no files open.
    Idle,
    /// Validating config, opening sinks, constructing the capture.
    Starting,
    /// The worker is reading packets and appending them to disk.
    Streaming,
    /// Sinks closing, device stopping and releasing.
    Stopping,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self, Self::Stopping)
    }
}
