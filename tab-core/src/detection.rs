//! # Detection Module
//!
//! Turns a stream of `(time, frequency)` pitch samples into note detections.
//!
//! The builder thins the stream to one sample per time bucket, drops samples
//! outside the instrument's range, classifies the rest as notes and resolves
//! each note to a fretboard position.

use crate::config::InstrumentConfig;
use crate::fretboard::{FretPosition, FretboardMapper};
use crate::note::NoteIdentity;
use crate::tuning::NoteClassifier;
use tracing::debug;

/// One frequency estimate from a pitch tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSample {
    /// Seconds from the start of the audio.
    pub time: f32,
    /// Detected fundamental frequency in Hz.
    pub frequency: f32,
}

impl PitchSample {
    pub fn new(time: f32, frequency: f32) -> Self {
        Self { time, frequency }
    }
}

/// A classified, position-resolved note event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Seconds from the start of the audio.
    pub time: f32,
    pub note: NoteIdentity,
    /// The measured frequency the note was classified from, in Hz.
    pub frequency: f32,
    /// Where the note is played; `None` when no string can reach it.
    pub position: Option<FretPosition>,
}

impl Detection {
    /// A detection with a known position, at the note's nominal frequency.
    pub fn placed(time: f32, note: NoteIdentity, string: u8, fret: u8) -> Self {
        Self {
            time,
            note,
            frequency: crate::tuning::equal_tempered_frequency(note),
            position: Some(FretPosition { string, fret }),
        }
    }

    pub fn string(&self) -> Option<u8> {
        self.position.map(|p| p.string)
    }

    pub fn fret(&self) -> Option<u8> {
        self.position.map(|p| p.fret)
    }
}

/// Builds [`Detection`]s from raw pitch samples.
#[derive(Debug, Clone)]
pub struct EventStreamBuilder {
    classifier: NoteClassifier,
    mapper: FretboardMapper,
    min_freq: f32,
    max_freq: f32,
    frame_interval: f32,
    max_duration: f32,
}

impl EventStreamBuilder {
    pub fn new(config: &InstrumentConfig) -> Self {
        Self {
            classifier: NoteClassifier::for_range(config.min_freq, config.max_freq),
            mapper: FretboardMapper::new(config.tuning, config.max_fret),
            min_freq: config.min_freq,
            max_freq: config.max_freq,
            frame_interval: config.frame_interval,
            max_duration: config.max_duration,
        }
    }

    pub fn classifier(&self) -> &NoteClassifier {
        &self.classifier
    }

    /// Classifies and places a single frequency observed at `time`.
    ///
    /// Returns `None` only when the frequency cannot be classified at all.
    pub fn detect(&self, time: f32, frequency: f32) -> Option<Detection> {
        let note = self.classifier.classify(frequency)?;
        Some(Detection {
            time,
            note,
            frequency,
            position: self.mapper.map(note),
        })
    }

    /// Processes an ordered sequence of pitch samples.
    ///
    /// 1. Samples with a negative or non-finite time, or one past
    ///    `max_duration`, are discarded.
    /// 2. Only the first sample of each `frame_interval` bucket is kept.
    /// 3. A kept sample outside `[min_freq, max_freq]` is discarded; its bucket
    ///    yields nothing.
    /// 4. The remaining samples are classified and mapped to the fretboard.
    pub fn build<I>(&self, samples: I) -> Vec<Detection>
    where
        I: IntoIterator<Item = PitchSample>,
    {
        let mut detections = Vec::new();
        let mut last_bucket: Option<i64> = None;
        let mut discarded = 0usize;

        for sample in samples {
            if !(0.0..=self.max_duration).contains(&sample.time) {
                discarded += 1;
                continue;
            }
            let bucket = (sample.time / self.frame_interval).floor() as i64;
            if last_bucket == Some(bucket) {
                continue;
            }
            last_bucket = Some(bucket);

            if !(self.min_freq..=self.max_freq).contains(&sample.frequency) {
                discarded += 1;
                continue;
            }
            match self.detect(sample.time, sample.frequency) {
                Some(detection) => detections.push(detection),
                None => {
                    debug!(
                        "[DETECT] Could not classify {:.2} Hz at {:.2}s",
                        sample.frequency, sample.time
                    );
                }
            }
        }

        debug!(
            "[DETECT] Built {} detections, discarded {} samples",
            detections.len(),
            discarded
        );
        detections
    }
}

impl Default for EventStreamBuilder {
    fn default() -> Self {
        Self::new(&InstrumentConfig::default())
    }
}
