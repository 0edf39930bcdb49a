use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RecordError;
use crate::models::summary::SessionSummary;

/// Write the session summary as a JSON sidecar file.
///
/// Creates `{audio_path}.session.json` alongside the recording.
pub fn write_summary(summary: &SessionSummary, audio_path: &Path) -> Result<(), RecordError> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| RecordError::Storage(format!("failed to serialize session summary: {e}")))?;
    fs::write(sidecar_path(audio_path), json)
        .map_err(|e| RecordError::Storage(format!("failed to write session sidecar: {e}")))?;
    Ok(())
}

/// Read a session summary back from its JSON sidecar.
pub fn read_summary(audio_path: &Path) -> Result<SessionSummary, RecordError> {
    let json = fs::read_to_string(sidecar_path(audio_path))
        .map_err(|e| RecordError::Storage(format!("failed to read session sidecar: {e}")))?;
    serde_json::from_str(&json)
        .map_err(|e| RecordError::Storage(format!("failed to parse session sidecar: {e}")))
}

pub fn sidecar_path(audio_path: &Path) -> PathBuf {
    let mut os = audio_path.as_os_str().to_owned();
    os.push(".session.json");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::RecordConfig;

    #[test]
    fn summary_round_trips_through_sidecar() {
        let audio_path = std::env::temp_dir().join("pcm_record_test_sidecar.pcm");
        let mut summary =
            SessionSummary::new(&RecordConfig::default(), &audio_path, Path::new("/tmp/ts.log"));
        summary.packets_written = 42;
        summary.bytes_written = 42 * 320;
        summary.frames_read = 42 * 160;
        summary.checksum = Some("ab".repeat(32));

        write_summary(&summary, &audio_path).unwrap();
        let back = read_summary(&audio_path).unwrap();
        assert_eq!(back, summary);

        fs::remove_file(sidecar_path(&audio_path)).ok();
    }
}
