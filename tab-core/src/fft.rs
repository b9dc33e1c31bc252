//! # Fast Fourier Transform (FFT) Module
//!
//! Magnitude spectra for single analysis frames, used to refine the pitch
//! tracker's time-domain estimates.
//!
//! ## Features
//! - High-performance FFT using RustFFT
//! - Hann windowing for reduced spectral leakage
//! - DC offset removal for accurate analysis

use rustfft::{FftPlanner, num_complex::Complex};

/// Removes the DC offset from a signal by making its average value zero.
fn remove_dc_offset(signal: &mut [f32]) {
    let len = signal.len();
    if len == 0 {
        return;
    }
    let avg = signal.iter().sum::<f32>() / len as f32;
    if avg.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= avg;
        }
    }
}

/// Applies a Hann window to the input buffer to reduce spectral leakage.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let n_minus_1 = (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        let multiplier = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n_minus_1).cos());
        *sample *= multiplier;
    }
}

/// Reusable forward FFT for frames of one fixed length.
pub struct SpectrumAnalyzer {
    fft: std::sync::Arc<dyn rustfft::Fft<f32>>,
    frame_size: usize,
}

impl SpectrumAnalyzer {
    pub fn new(frame_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(frame_size),
            frame_size,
        }
    }

    /// Magnitude spectrum of `frame` up to the Nyquist frequency.
    ///
    /// The frame is DC-corrected and Hann-windowed before the transform.
    /// Frames shorter than the analyzer's size are zero-padded, longer ones
    /// truncated.
    pub fn magnitudes(&self, frame: &[f32]) -> Vec<f32> {
        let mut processed = vec![0.0; self.frame_size];
        let len = frame.len().min(self.frame_size);
        processed[..len].copy_from_slice(&frame[..len]);
        remove_dc_offset(&mut processed[..len]);
        apply_hann_window(&mut processed[..len]);

        let mut buffer: Vec<Complex<f32>> = processed
            .into_iter()
            .map(|sample| Complex { re: sample, im: 0.0 })
            .collect();
        self.fft.process(&mut buffer);

        buffer
            .iter()
            .take(self.frame_size / 2)
            .map(|c| c.norm()) // .norm() is sqrt(re^2 + im^2)
            .collect()
    }
}
