use std::fmt;

use serde::{Deserialize, Serialize};

/// Container/format selection for a recording session.
///
/// MP3 is a passthrough stub: selecting it forces 16-bit capture but the
/// bytes written to disk are still raw PCM. No compression happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Pcm,
    Wav,
    Mp3,
}

impl RecordFormat {
    /// Conventional file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pcm => ".pcm",
            Self::Wav => ".wav",
            Self::Mp3 => ".mp3",
        }
    }
}

/// Requested input channel layout.
///
/// `Unsupported` stands for any layout the recorder cannot capture
/// (surround configurations and the like). Derived lookups degrade to
/// the `0` sentinel for it; session start rejects such configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelConfig {
    Mono,
    Stereo,
    Unsupported,
}

/// Requested sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingConfig {
    Pcm8Bit,
    Pcm16Bit,
    Unsupported,
}

/// Which input the audio comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioInput {
    Microphone,
    System,
}

/// Immutable description of the desired capture format.
///
/// Constructed once per recording session and passed by value into the
/// capture pipeline. The derived accessors (`encoding_bits`,
/// `channel_count`, `real_encoding_bits`) are pure lookups over the
/// stored fields; unsupported values resolve to a `0` sentinel rather
/// than an error, and callers must treat `0` as "capture cannot
/// proceed" (see `validate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    pub format: RecordFormat,
    pub channel_config: ChannelConfig,
    pub encoding_config: EncodingConfig,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    pub input: AudioInput,
}

impl RecordConfig {
    /// Resolved bit depth. MP3 forces 16-bit capture; otherwise the
    /// stored encoding resolves to 8 or 16, or the `0` sentinel.
    pub fn encoding_bits(&self) -> u16 {
        match self.format {
            RecordFormat::Mp3 => 16,
            _ => self.real_encoding_bits(),
        }
    }

    /// Bit depth of the stored encoding, ignoring the MP3 override.
    pub fn real_encoding_bits(&self) -> u16 {
        match self.encoding_config {
            EncodingConfig::Pcm8Bit => 8,
            EncodingConfig::Pcm16Bit => 16,
            EncodingConfig::Unsupported => 0,
        }
    }

    /// Number of input channels, or the `0` sentinel.
    pub fn channel_count(&self) -> u16 {
        match self.channel_config {
            ChannelConfig::Mono => 1,
            ChannelConfig::Stereo => 2,
            ChannelConfig::Unsupported => 0,
        }
    }

    /// Reject configurations the capture pipeline cannot proceed with.
    ///
    /// Checked before any device or file handle is opened.
    pub fn validate(&self) -> Result<(), String> {
        if self.encoding_bits() == 0 {
            return Err("unsupported sample encoding".into());
        }
        if self.channel_count() == 0 {
            return Err("unsupported channel configuration".into());
        }
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            format: RecordFormat::Wav,
            channel_config: ChannelConfig::Mono,
            encoding_config: EncodingConfig::Pcm16Bit,
            sample_rate: 16_000,
            input: AudioInput::Microphone,
        }
    }
}

impl fmt::Display for RecordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "format: {:?}, sample rate: {} Hz, bit depth: {}, channels: {}",
            self.format,
            self.sample_rate,
            self.encoding_bits(),
            self.channel_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_lookups_for_supported_values() {
        let config = RecordConfig::default();
        assert_eq!(config.encoding_bits(), 16);
        assert_eq!(config.real_encoding_bits(), 16);
        assert_eq!(config.channel_count(), 1);

        let stereo8 = RecordConfig {
            channel_config: ChannelConfig::Stereo,
            encoding_config: EncodingConfig::Pcm8Bit,
            ..RecordConfig::default()
        };
        assert_eq!(stereo8.encoding_bits(), 8);
        assert_eq!(stereo8.channel_count(), 2);
    }

    #[test]
    fn mp3_forces_16_bit() {
        let config = RecordConfig {
            format: RecordFormat::Mp3,
            encoding_config: EncodingConfig::Pcm8Bit,
            ..RecordConfig::default()
        };
        assert_eq!(config.encoding_bits(), 16);
        // The stored encoding still resolves on its own.
        assert_eq!(config.real_encoding_bits(), 8);
    }

    #[test]
    fn unsupported_values_degrade_to_sentinel() {
        let config = RecordConfig {
            channel_config: ChannelConfig::Unsupported,
            encoding_config: EncodingConfig::Unsupported,
            ..RecordConfig::default()
        };
        assert_eq!(config.encoding_bits(), 0);
        assert_eq!(config.channel_count(), 0);
    }

    #[test]
    fn validate_rejects_sentinels_and_zero_rate() {
        assert!(RecordConfig::default().validate().is_ok());

        let bad_channels = RecordConfig {
            channel_config: ChannelConfig::Unsupported,
            ..RecordConfig::default()
        };
        assert!(bad_channels.validate().is_err());

        let bad_encoding = RecordConfig {
            encoding_config: EncodingConfig::Unsupported,
            ..RecordConfig::default()
        };
        assert!(bad_encoding.validate().is_err());

        // MP3 masks an unsupported encoding: capture still proceeds at 16-bit.
        let mp3_masked = RecordConfig {
            format: RecordFormat::Mp3,
            encoding_config: EncodingConfig::Unsupported,
            ..RecordConfig::default()
        };
        assert!(mp3_masked.validate().is_ok());

        let zero_rate = RecordConfig {
            sample_rate: 0,
            ..RecordConfig::default()
        };
        assert!(zero_rate.validate().is_err());
    }

    #[test]
    fn format_extensions() {
        assert_eq!(RecordFormat::Pcm.extension(), ".pcm");
        assert_eq!(RecordFormat::Wav.extension(), ".wav");
        assert_eq!(RecordFormat::Mp3.extension(), ".mp3");
    }

    #[test]
    fn serde_round_trip() {
        let config = RecordConfig {
            format: RecordFormat::Pcm,
            channel_config: ChannelConfig::Stereo,
            encoding_config: EncodingConfig::Pcm16Bit,
            sample_rate: 48_000,
            input: AudioInput::Microphone,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RecordConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
