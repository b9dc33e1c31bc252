//! # Pitch Tracking Module
//!
//! Turns raw mono audio into a sequence of [`PitchSample`]s, one per analysis
//! frame that carries a clear pitch.
//!
//! ## Features
//! - YIN pitch detection with octave error prevention
//! - Noise rejection using RMS gating and a clarity check
//! - Parabolic interpolation for sub-sample accuracy
//! - Spectrum refinement for improved precision

use crate::detection::PitchSample;
use crate::fft::SpectrumAnalyzer;
use tracing::debug;

/// Default analysis frame length in samples.
pub const FRAME_SIZE: usize = 2048;

/// Default distance between consecutive frames in samples.
pub const HOP_SIZE: usize = 1024;

/// Default minimum frame RMS for a frame to be analysed.
pub const AMPLITUDE_THRESHOLD: f32 = 0.01;

/// Highest normalized difference accepted as a clear period.
const CLARITY_THRESHOLD: f32 = 0.1;

/// Estimates the fundamental frequency of one frame with the YIN algorithm.
///
/// # Arguments
/// * `signal` - Input audio frame
/// * `sample_rate` - Sample rate in Hz
/// * `amplitude_threshold` - Minimum RMS amplitude for pitch detection
///
/// # Returns
/// * `Some(frequency)` - Detected frequency in Hz
/// * `None` - No pitch detected (silence, noise, or a frame too short to analyse)
pub fn detect_pitch_yin(
    signal: &[f32],
    sample_rate: u32,
    amplitude_threshold: f32,
) -> Option<f32> {
    let frame_size = signal.len();
    let half = frame_size / 2;
    if half < 3 {
        return None;
    }

    // --- Noise Gate: Calculate RMS to filter out silence/noise ---
    let rms = (signal.iter().map(|&s| s * s).sum::<f32>() / frame_size as f32).sqrt();
    if rms < amplitude_threshold {
        return None;
    }

    // --- Difference function ---
    let mut yin_buffer = vec![0.0_f32; half];
    for tau in 1..half {
        let mut diff = 0.0;
        for i in 0..half {
            let delta = signal[i] - signal[i + tau];
            diff += delta * delta;
        }
        yin_buffer[tau] = diff;
    }

    // --- Cumulative mean normalized difference ---
    let mut running_sum = 0.0;
    yin_buffer[0] = 1.0;
    for (tau, value) in yin_buffer.iter_mut().enumerate().skip(1) {
        running_sum += *value;
        if running_sum != 0.0 {
            *value *= tau as f32 / running_sum;
        } else {
            *value = 1.0;
        }
    }

    // --- First significant dip, to avoid octave errors ---
    let min_val = yin_buffer
        .iter()
        .skip(1)
        .copied()
        .fold(f32::INFINITY, f32::min);
    let threshold = min_val + 0.05;

    let mut period = (2..half).find(|&tau| yin_buffer[tau] < threshold)?;
    // Walk down to the bottom of the dip.
    while period + 1 < half && yin_buffer[period + 1] < yin_buffer[period] {
        period += 1;
    }

    // --- Clarity check to reject noise ---
    if yin_buffer[period] > CLARITY_THRESHOLD || period + 1 >= half {
        return None;
    }

    // --- Parabolic interpolation for better precision ---
    let y1 = yin_buffer[period - 1];
    let y2 = yin_buffer[period];
    let y3 = yin_buffer[period + 1];
    let curvature = y1 - 2.0 * y2 + y3;
    let period_float = if curvature != 0.0 {
        period as f32 + (y1 - y3) / (2.0 * curvature)
    } else {
        period as f32
    };

    let frequency = sample_rate as f32 / period_float;
    (frequency.is_finite() && frequency > 20.0).then_some(frequency)
}

/// Refines a frequency estimate using a pre-computed magnitude spectrum.
///
/// Searches two bins either side of the estimate for the strongest peak and
/// interpolates its position on a log scale.
///
/// # Returns
/// * `Some(refined_freq)` - Refined frequency estimate
/// * `None` - `rough_freq` is not positive
pub fn refine_from_spectrum(
    spectrum_magnitudes: &[f32],
    rough_freq: f32,
    sample_rate: u32,
) -> Option<f32> {
    if rough_freq <= 0.0 {
        return None;
    }
    if spectrum_magnitudes.len() < 3 {
        return Some(rough_freq);
    }
    let buffer_size = spectrum_magnitudes.len() * 2;
    let target_bin = (rough_freq * buffer_size as f32) / sample_rate as f32;
    let search_radius = 2.0;
    let start_bin = (target_bin - search_radius).max(0.0) as usize;
    let end_bin = (target_bin + search_radius).min((spectrum_magnitudes.len() - 1) as f32) as usize;
    if start_bin >= end_bin {
        return Some(rough_freq);
    }

    let Some(peak_bin) = spectrum_magnitudes[start_bin..=end_bin]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(offset, _)| start_bin + offset)
    else {
        return Some(rough_freq);
    };

    if peak_bin == 0 || peak_bin >= spectrum_magnitudes.len() - 1 {
        return Some(rough_freq);
    }

    let y1 = spectrum_magnitudes[peak_bin - 1].ln();
    let y2 = spectrum_magnitudes[peak_bin].ln();
    let y3 = spectrum_magnitudes[peak_bin + 1].ln();
    if !y1.is_finite() || !y2.is_finite() || !y3.is_finite() {
        return Some(rough_freq);
    }

    let denominator = 2.0 * y2 - y1 - y3;
    if denominator.abs() < 1e-6 {
        return Some(rough_freq);
    }

    let peak_shift = (y3 - y1) / (2.0 * denominator);
    let final_freq = ((peak_bin as f32 + peak_shift) * sample_rate as f32) / buffer_size as f32;
    if final_freq.is_finite() && final_freq > 0.0 {
        Some(final_freq)
    } else {
        Some(rough_freq)
    }
}

/// Frame-by-frame pitch tracker over a complete recording.
#[derive(Debug, Clone)]
pub struct PitchTracker {
    pub frame_size: usize,
    pub hop_size: usize,
    pub amplitude_threshold: f32,
}

impl Default for PitchTracker {
    fn default() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            hop_size: HOP_SIZE,
            amplitude_threshold: AMPLITUDE_THRESHOLD,
        }
    }
}

impl PitchTracker {
    /// Tracks the pitch of `samples` frame by frame.
    ///
    /// Each frame with a clear pitch yields one sample stamped with the
    /// frame's start time. Audio shorter than one frame yields nothing.
    pub fn track(&self, samples: &[f32], sample_rate: u32) -> Vec<PitchSample> {
        if sample_rate == 0 || self.frame_size == 0 || samples.len() < self.frame_size {
            return Vec::new();
        }
        let hop = self.hop_size.max(1);
        let analyzer = SpectrumAnalyzer::new(self.frame_size);

        let pitches: Vec<PitchSample> = (0..=samples.len() - self.frame_size)
            .step_by(hop)
            .filter_map(|start| {
                let frame = &samples[start..start + self.frame_size];
                let rough = detect_pitch_yin(frame, sample_rate, self.amplitude_threshold)?;
                let spectrum = analyzer.magnitudes(frame);
                let frequency = refine_from_spectrum(&spectrum, rough, sample_rate)?;
                Some(PitchSample::new(start as f32 / sample_rate as f32, frequency))
            })
            .collect();

        debug!(
            "[PITCH] Tracked {} pitched frames from {} samples at {} Hz",
            pitches.len(),
            samples.len(),
            sample_rate
        );
        pitches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32;
                amplitude * phase.sin()
            })
            .collect()
    }

    #[test]
    fn yin_finds_a_pure_tone() {
        let frame = sine(110.0, 44100, FRAME_SIZE, 0.5);
        let freq = detect_pitch_yin(&frame, 44100, AMPLITUDE_THRESHOLD).unwrap();
        assert!((freq - 110.0).abs() < 1.0, "got {freq}");
    }

    #[test]
    fn yin_rejects_silence() {
        let frame = vec![0.0; FRAME_SIZE];
        assert_eq!(detect_pitch_yin(&frame, 44100, AMPLITUDE_THRESHOLD), None);
    }

    #[test]
    fn refinement_keeps_estimates_near_the_true_pitch() {
        let frame = sine(440.0, 44100, FRAME_SIZE, 0.5);
        let spectrum = SpectrumAnalyzer::new(FRAME_SIZE).magnitudes(&frame);
        let refined = refine_from_spectrum(&spectrum, 445.0, 44100).unwrap();
        assert!((refined - 440.0).abs() < 5.0, "got {refined}");
        assert_eq!(refine_from_spectrum(&spectrum, 0.0, 44100), None);
    }

    #[test]
    fn tracker_stamps_frames_with_their_start_time() {
        let samples = sine(196.0, 44100, 44100, 0.5);
        let pitches = PitchTracker::default().track(&samples, 44100);
        assert!(!pitches.is_empty());
        assert_eq!(pitches[0].time, 0.0);
        assert!(pitches.windows(2).all(|w| w[1].time > w[0].time));
        for p in &pitches {
            assert!((p.frequency - 196.0).abs() < 4.0, "got {}", p.frequency);
        }
    }

    #[test]
    fn short_or_silent_audio_yields_nothing() {
        let tracker = PitchTracker::default();
        assert!(tracker.track(&[0.1; 100], 44100).is_empty());
        assert!(tracker.track(&vec![0.0; 8192], 44100).is_empty());
    }
}
