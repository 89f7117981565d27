// Audio Export - Captured audio to 16-bit stereo WAV
//
// The encoder writes the canonical 44-byte PCM header followed by interleaved
// little-endian samples. Files are named after the UTC time of the export.

use chrono::{DateTime, SecondsFormat, Utc};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

pub const WAV_CHANNELS: u16 = 2;
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("WAV encoding failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No audio captured")]
    Empty,
}

/// Clamp to [-1, 1] then scale: negatives by 32768, positives by 32767
pub fn float_to_pcm16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

pub fn wav_spec(sample_rate: u32) -> WavSpec {
    WavSpec {
        channels: WAV_CHANNELS,
        sample_rate,
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Encode interleaved stereo samples into an in-memory WAV file
pub fn encode_wav(interleaved: &[f32], sample_rate: u32) -> Result<Vec<u8>, CaptureError> {
    let mut cursor = Cursor::new(Vec::with_capacity(WAV_HEADER_LEN + interleaved.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, wav_spec(sample_rate))?;
        for &sample in interleaved {
            writer.write_sample(float_to_pcm16(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// `recording_<UTC ISO-8601 with ms>.wav` with ':' and '.' replaced by '-'
pub fn recording_file_name(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("recording_{}.wav", stamp)
}

/// Encode and write a capture to `path`
pub fn write_wav_file(
    path: &Path,
    interleaved: &[f32],
    sample_rate: u32,
) -> Result<(), CaptureError> {
    if interleaved.is_empty() {
        return Err(CaptureError::Empty);
    }
    let bytes = encode_wav(interleaved, sample_rate)?;
    std::fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        frames = interleaved.len() / WAV_CHANNELS as usize,
        sample_rate,
        "Recording saved"
    );
    Ok(())
}

/// Write a capture into `dir` under a timestamped name. Returns the full path.
pub fn save_recording(
    dir: &Path,
    interleaved: &[f32],
    sample_rate: u32,
) -> Result<PathBuf, CaptureError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(recording_file_name(Utc::now()));
    write_wav_file(&path, interleaved, sample_rate)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pcm_conversion() {
        assert_eq!(float_to_pcm16(0.0), 0);
        assert_eq!(float_to_pcm16(1.0), 32767);
        assert_eq!(float_to_pcm16(-1.0), -32768);
        assert_eq!(float_to_pcm16(2.5), 32767);
        assert_eq!(float_to_pcm16(-7.0), -32768);
        assert_eq!(float_to_pcm16(0.5), 16383);
        assert_eq!(float_to_pcm16(f32::NAN), 0);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_wav(&[0.0, 0.0, 0.5, -0.5], 44100).unwrap();
        assert_eq!(bytes.len(), WAV_HEADER_LEN + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(&bytes[36..40], b"data");

        let u16_at = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let u32_at =
            |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        assert_eq!(u32_at(4), 36 + 8);
        assert_eq!(u32_at(16), 16);
        assert_eq!(u16_at(20), 1);
        assert_eq!(u16_at(22), 2);
        assert_eq!(u32_at(24), 44100);
        assert_eq!(u32_at(28), 44100 * 4);
        assert_eq!(u16_at(32), 4);
        assert_eq!(u16_at(34), 16);
        assert_eq!(u32_at(40), 8);
    }

    #[test]
    fn test_recording_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(
            recording_file_name(at),
            "recording_2024-03-09T14-05-07-042Z.wav"
        );
    }

    #[test]
    fn test_empty_capture_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        assert!(matches!(
            write_wav_file(&path, &[], 44100),
            Err(CaptureError::Empty)
        ));
        assert!(!path.exists());
    }
}
