use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::error::RecordError;

/// Durably appends raw sample bytes and one timestamp record per
/// packet to two parallel files.
///
/// The audio sink is a headerless little-endian PCM stream, written
/// unbuffered so every successful append is on its way to disk. The
/// timestamp sink is UTF-8 text, one decimal integer per line in
/// packet order, buffered and flushed on finish. The audio checksum is
/// accumulated as bytes land, so `finish` never re-reads the sink.
#[derive(Debug)]
pub struct RecordingWriter {
    audio: File,
    timestamps: BufWriter<File>,
    hasher: Sha256,
    packets_written: u64,
    bytes_written: u64,
}

impl RecordingWriter {
    /// Open both sinks. The target directory must already exist; the
    /// writer never creates directories.
    pub fn create(audio_path: &Path, timestamp_path: &Path) -> Result<Self, RecordError> {
        let audio = File::create(audio_path).map_err(|e| {
            RecordError::Storage(format!("failed to create {}: {e}", audio_path.display()))
        })?;
        let timestamps = File::create(timestamp_path).map_err(|e| {
            RecordError::Storage(format!("failed to create {}: {e}", timestamp_path.display()))
        })?;

        Ok(Self {
            audio,
            timestamps: BufWriter::new(timestamps),
            hasher: Sha256::new(),
            packets_written: 0,
            bytes_written: 0,
        })
    }

    /// Append one complete packet and its timestamp record.
    ///
    /// The sample bytes land first; a packet that fails mid-append
    /// never produces a timestamp line.
    pub fn append_packet(&mut self, samples: &[u8], timestamp_micros: i64) -> Result<(), RecordError> {
        self.audio
            .write_all(samples)
            .map_err(|e| RecordError::Storage(format!("audio sink write failed: {e}")))?;
        self.hasher.update(samples);
        writeln!(self.timestamps, "{timestamp_micros}")
            .map_err(|e| RecordError::Storage(format!("timestamp sink write failed: {e}")))?;

        self.packets_written += 1;
        self.bytes_written += samples.len() as u64;
        Ok(())
    }

    pub fn packets_written(&self) -> u64 {
        self.packets_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush both sinks and return the SHA-256 hex digest of the
    /// appended audio bytes.
    pub fn finish(mut self) -> Result<String, RecordError> {
        self.timestamps
            .flush()
            .map_err(|e| RecordError::Storage(format!("timestamp sink flush failed: {e}")))?;
        self.audio
            .sync_all()
            .map_err(|e| RecordError::Storage(format!("audio sink sync failed: {e}")))?;
        let digest = self.hasher.finalize();
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_paths(name: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir();
        (
            dir.join(format!("pcm_record_test_{name}.pcm")),
            dir.join(format!("pcm_record_test_{name}.ts")),
        )
    }

    #[test]
    fn appends_audio_and_timestamp_lines_in_order() {
        let (audio_path, ts_path) = temp_paths("append");
        let mut writer = RecordingWriter::create(&audio_path, &ts_path).unwrap();

        writer.append_packet(&[0x01; 320], 1_700_000_000_000).unwrap();
        writer.append_packet(&[0x02; 320], 1_700_000_000_010).unwrap();
        writer.append_packet(&[0x03; 320], 1_700_000_000_020).unwrap();

        assert_eq!(writer.packets_written(), 3);
        assert_eq!(writer.bytes_written(), 960);

        let checksum = writer.finish().unwrap();
        assert_eq!(checksum.len(), 64);

        let audio = fs::read(&audio_path).unwrap();
        assert_eq!(audio.len(), 960);
        assert_eq!(&audio[..320], &[0x01; 320][..]);

        let lines: Vec<i64> = fs::read_to_string(&ts_path)
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![1_700_000_000_000, 1_700_000_000_010, 1_700_000_000_020]
        );

        fs::remove_file(&audio_path).ok();
        fs::remove_file(&ts_path).ok();
    }

    #[test]
    fn line_count_matches_packet_count() {
        let (audio_path, ts_path) = temp_paths("line_count");
        let mut writer = RecordingWriter::create(&audio_path, &ts_path).unwrap();

        for i in 0..7 {
            writer.append_packet(&[i as u8; 64], i64::from(i)).unwrap();
        }
        writer.finish().unwrap();

        let lines = fs::read_to_string(&ts_path).unwrap().lines().count();
        assert_eq!(lines, 7);

        fs::remove_file(&audio_path).ok();
        fs::remove_file(&ts_path).ok();
    }

    #[test]
    fn create_fails_in_missing_directory() {
        let dir = std::env::temp_dir().join("pcm_record_test_no_such_dir");
        let err = RecordingWriter::create(&dir.join("a.pcm"), &dir.join("a.ts")).unwrap_err();
        assert!(matches!(err, RecordError::Storage(_)));
    }

    #[test]
    fn checksum_matches_the_file_content() {
        let (audio_path, ts_path) = temp_paths("checksum_content");
        let mut writer = RecordingWriter::create(&audio_path, &ts_path).unwrap();
        writer.append_packet(&[0x10; 320], 1).unwrap();
        writer.append_packet(&[0x20; 320], 2).unwrap();
        let checksum = writer.finish().unwrap();

        let digest = Sha256::digest(fs::read(&audio_path).unwrap());
        let expected: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(checksum, expected);

        fs::remove_file(&audio_path).ok();
        fs::remove_file(&ts_path).ok();
    }

    #[test]
    fn checksum_is_deterministic_for_same_bytes() {
        let (a1, t1) = temp_paths("checksum_a");
        let (a2, t2) = temp_paths("checksum_b");

        let mut w1 = RecordingWriter::create(&a1, &t1).unwrap();
        w1.append_packet(&[0x5A; 128], 1).unwrap();
        let c1 = w1.finish().unwrap();

        let mut w2 = RecordingWriter::create(&a2, &t2).unwrap();
        w2.append_packet(&[0x5A; 128], 2).unwrap();
        let c2 = w2.finish().unwrap();

        // Same audio bytes, different timestamps: audio checksums match.
        assert_eq!(c1, c2);

        for p in [a1, t1, a2, t2] {
            fs::remove_file(p).ok();
        }
    }
}
