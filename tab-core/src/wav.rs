//! WAV file loading and saving for [`Recording`]s.

use crate::audio::Recording;
use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;
use tracing::debug;

/// Reads a WAV file into a mono recording.
///
/// Integer samples are scaled to -1.0..=1.0 and multi-channel audio is
/// averaged down to one channel.
pub fn read_wav(path: impl AsRef<Path>) -> Result<Recording> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)
        .with_context(|| format!("failed to open audio file {}", path.display()))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to decode {}", path.display()))?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("unsupported bit depth {} in {}", spec.bits_per_sample, path.display());
            }
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .with_context(|| format!("failed to decode {}", path.display()))?
        }
    };

    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    debug!(
        "[WAV] Loaded {} ({} Hz, {} channels, {} frames)",
        path.display(),
        spec.sample_rate,
        spec.channels,
        samples.len()
    );
    Ok(Recording::new(samples, spec.sample_rate))
}

/// Writes a recording as 16-bit mono PCM.
///
/// # Returns
/// * `Ok(true)` - File written
/// * `Ok(false)` - The recording is empty; no file is created
/// * `Err(e)` - The file could not be created or written
pub fn write_wav(recording: &Recording, path: impl AsRef<Path>) -> Result<bool> {
    if recording.is_empty() {
        return Ok(false);
    }
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: recording.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for &sample in &recording.samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(value)?;
    }
    writer
        .finalize()
        .with_context(|| format!("failed to finalize {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_recording_writes_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty_test.wav");
        assert!(!write_wav(&Recording::new(Vec::new(), 44100), &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn written_file_is_16_bit_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mock_recording.wav");
        let recording = Recording::new(vec![0.0; 44100], 44100);
        assert!(write_wav(&recording, &path).unwrap());

        let reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 44100);
    }

    #[test]
    fn reading_back_preserves_samples_within_quantization() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.wav");
        let recording = Recording::new(vec![0.0, 0.25, -0.5, 0.999], 22050);
        write_wav(&recording, &path).unwrap();
        let loaded = read_wav(&path).unwrap();
        assert_eq!(loaded.sample_rate, 22050);
        assert_eq!(loaded.samples.len(), 4);
        for (a, b) in loaded.samples.iter().zip(&recording.samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn stereo_files_are_downmixed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(0.5_f32, -0.5_f32), (1.0, 0.0)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = read_wav(&path).unwrap();
        assert_eq!(loaded.samples, vec![0.0, 0.5]);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = read_wav(dir.path().join("nope.wav")).unwrap_err();
        assert!(err.to_string().contains("failed to open audio file"));
    }
}
