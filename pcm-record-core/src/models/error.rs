use std::fmt;

use thiserror::Error;

/// Errors that can occur across the recording pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The config resolved to an unsupported encoding or channel count.
    /// Fatal to session start; reported before any handle is opened.
    #[error("configuration rejected: {0}")]
    Configuration(String),

    /// A single packet read failed. Recovered by retrying the packet;
    /// never terminates the session on its own.
    #[error("device read failed: {0}")]
    DeviceRead(DeviceErrorCode),

    /// A sink write or file operation failed. Fatal to the session.
    #[error("storage error: {0}")]
    Storage(String),

    /// Requested audio focus was not granted. Informational only;
    /// recording proceeds regardless.
    #[error("audio focus not granted")]
    FocusDenied,

    /// A start request arrived while a session was still active.
    #[error("a recording session is already active")]
    SessionActive,

    /// A stop request arrived with no session running.
    #[error("no recording session is active")]
    NoSession,

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Device-level error code carried by a failed packet read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorCode {
    InvalidOperation,
    BadValue,
    DeadObject,
    /// Any other driver error, including a zero-length read.
    Generic(i32),
}

impl fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperation => write!(f, "ERROR_INVALID_OPERATION"),
            Self::BadValue => write!(f, "ERROR_BAD_VALUE"),
            Self::DeadObject => write!(f, "ERROR_DEAD_OBJECT"),
            Self::Generic(code) => write!(f, "ERROR({code})"),
        }
    }
}
