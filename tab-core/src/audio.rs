//! # Audio Capture Module
//!
//! This module handles microphone capture using CPAL (Cross-Platform Audio
//! Library). Capture runs until the caller signals it to stop and hands back
//! one complete [`Recording`]; the transcription pipeline only ever sees
//! finished recordings.
//!
//! ## Features
//! - Automatic audio device selection
//! - Mono 32-bit float capture at the rate closest to 44.1 kHz
//! - Chunked streaming from the device callback over a channel

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, select};
use tracing::{error, info, warn};

/// Number of samples the device callback groups into one chunk.
pub const CHUNK_SIZE: usize = 1024;

/// Sample rate requested from the input device.
pub const TARGET_SAMPLE_RATE: u32 = 44100;

/// A complete mono recording.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    /// Samples in the range -1.0..=1.0.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Recording {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Length of the recording in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Records from the default input device until `shutdown` fires.
///
/// This function blocks; run it on a dedicated thread. The stream is paused
/// before the recording is returned.
///
/// # Arguments
/// * `shutdown` - Receiving a message (or a disconnect) ends the recording
///
/// # Returns
/// * `Ok(recording)` - Everything captured between start and shutdown
/// * `Err(e)` - No input device, no usable format, or stream setup failure
pub fn record_until(shutdown: Receiver<()>) -> Result<Recording> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 mono input format found"))?;

    let rate = TARGET_SAMPLE_RATE.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(rate));
    let sample_rate = config.sample_rate().0;
    let config: cpal::StreamConfig = config.into();

    info!("[AUDIO] Selected sample rate: {} Hz", sample_rate);

    let (chunk_tx, chunk_rx) = crossbeam_channel::unbounded::<Vec<f32>>();
    let err_fn = |err| error!("[AUDIO] An error occurred on the audio stream: {}", err);

    // Accumulates callback data until a full chunk is available.
    let mut pending = Vec::with_capacity(CHUNK_SIZE * 2);
    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            pending.extend_from_slice(data);
            while pending.len() >= CHUNK_SIZE {
                let chunk: Vec<f32> = pending.drain(..CHUNK_SIZE).collect();
                let _ = chunk_tx.send(chunk);
            }
        },
        err_fn,
        None,
    )?;

    stream.play()?;
    info!("[AUDIO] Recording started");

    let mut samples = Vec::new();
    loop {
        select! {
            recv(chunk_rx) -> msg => match msg {
                Ok(chunk) => samples.extend_from_slice(&chunk),
                Err(_) => {
                    warn!("[AUDIO] Audio channel closed");
                    break;
                }
            },
            recv(shutdown) -> _ => break,
        }
    }

    if let Err(e) = stream.pause() {
        warn!("[AUDIO] Error pausing stream: {}", e);
    }
    drop(stream);
    // Chunks that arrived between the shutdown signal and the pause.
    samples.extend(chunk_rx.try_iter().flatten());

    let recording = Recording::new(samples, sample_rate);
    info!("[AUDIO] Recording stopped after {:.2}s", recording.duration());
    Ok(recording)
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only mono 32-bit float configurations are considered; among those the one
/// whose rate range lies closest to `target_rate` wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            if (min..=max).contains(&target_rate) {
                0
            } else {
                min.abs_diff(target_rate).min(max.abs_diff(target_rate))
            }
        })
}
