use std::path::Path;

use serde::{Deserialize, Serialize};

use super::config::RecordConfig;
use super::error::RecordError;

/// Per-session bookkeeping, serialized as a JSON sidecar next to the
/// raw audio file when the session tears down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub created_at: String,
    pub audio_path: String,
    pub timestamp_path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub packets_written: u64,
    pub frames_read: u64,
    pub bytes_written: u64,
    /// SHA-256 hex digest of the finished audio file. `None` when the
    /// session failed before the sink could be finalized.
    pub checksum: Option<String>,
}

impl SessionSummary {
    pub fn new(config: &RecordConfig, audio_path: &Path, timestamp_path: &Path) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            audio_path: audio_path.to_string_lossy().into_owned(),
            timestamp_path: timestamp_path.to_string_lossy().into_owned(),
            sample_rate: config.sample_rate,
            channels: config.channel_count(),
            bit_depth: config.encoding_bits(),
            packets_written: 0,
            frames_read: 0,
            bytes_written: 0,
            checksum: None,
        }
    }
}

/// Terminal result of a recording session, returned from the worker
/// when it is joined.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Completed(SessionSummary),
    Failed {
        summary: SessionSummary,
        error: RecordError,
    },
}

impl SessionOutcome {
    pub fn summary(&self) -> &SessionSummary {
        match self {
            Self::Completed(summary) | Self::Failed { summary, .. } => summary,
        }
    }

    pub fn error(&self) -> Option<&RecordError> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
