//! # Transcriber Module
//!
//! One configured pipeline from audio or pitch samples to tab text:
//!
//! ```text
//! audio -> PitchTracker -> EventStreamBuilder -> TabTimeline -> render
//! ```
//!
//! Every call owns its detections and grid; a `Transcriber` can be reused
//! and shared freely since it holds no mutable state.

use crate::audio::Recording;
use crate::config::TabConfig;
use crate::detection::{Detection, EventStreamBuilder, PitchSample};
use crate::pitch::PitchTracker;
use crate::render;
use crate::timeline::{PlacementReport, TabTimeline};
use tracing::debug;

/// The result of transcribing one recording or sample stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub detections: Vec<Detection>,
    pub tab: String,
    pub report: PlacementReport,
}

#[derive(Debug, Clone)]
pub struct Transcriber {
    config: TabConfig,
    tracker: PitchTracker,
    builder: EventStreamBuilder,
    timeline: TabTimeline,
}

impl Transcriber {
    pub fn new(config: TabConfig) -> Self {
        Self {
            tracker: PitchTracker::default(),
            builder: EventStreamBuilder::new(&config.instrument),
            timeline: TabTimeline::new(config.layout.clone()),
            config,
        }
    }

    /// Classifies and places pitch samples.
    pub fn detect<I>(&self, samples: I) -> Vec<Detection>
    where
        I: IntoIterator<Item = PitchSample>,
    {
        self.builder.build(samples)
    }

    /// Renders already-built detections as tab text.
    pub fn render(&self, detections: &[Detection]) -> String {
        self.render_with_report(detections).0
    }

    fn render_with_report(&self, detections: &[Detection]) -> (String, PlacementReport) {
        let (grid, report) = self.timeline.place_with_report(detections);
        (render::render(&grid, &self.config.instrument.tuning), report)
    }

    /// The tab shown before anything has been transcribed.
    pub fn empty_tab(&self) -> String {
        render::render_empty(&self.config.layout, &self.config.instrument.tuning)
    }

    /// Runs the core pipeline on pitch samples.
    pub fn transcribe<I>(&self, samples: I) -> Transcription
    where
        I: IntoIterator<Item = PitchSample>,
    {
        let detections = self.detect(samples);
        let (tab, report) = self.render_with_report(&detections);
        debug!(
            "[TRANSCRIBE] {} detections: {} placed, {} unplayable, {} overflowed",
            detections.len(),
            report.placed,
            report.unplayable,
            report.overflowed
        );
        Transcription {
            detections,
            tab,
            report,
        }
    }

    /// Tracks the pitch of a recording, then runs the core pipeline.
    pub fn transcribe_recording(&self, recording: &Recording) -> Transcription {
        let pitches = self.tracker.track(&recording.samples, recording.sample_rate);
        self.transcribe(pitches)
    }
}

impl Default for Transcriber {
    fn default() -> Self {
        Self::new(TabConfig::default())
    }
}
