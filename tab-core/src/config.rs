//! # Configuration Module
//!
//! Instrument and layout settings for the transcription pipeline. A single
//! [`TabConfig`] value is built once and handed to each component at
//! construction; nothing reads configuration from global state.
//!
//! Configs are stored as pretty-printed JSON. Missing fields fall back to
//! their defaults, so a file containing only `{"instrument": {"max_fret": 12}}`
//! is valid.

use crate::fretboard::{DEFAULT_MAX_FRET, StringTuning};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Settings describing the instrument being transcribed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Lowest frequency accepted from the pitch tracker, in Hz. Just below E2.
    pub min_freq: f32,
    /// Highest frequency accepted from the pitch tracker, in Hz. Above E6.
    pub max_freq: f32,
    /// Open-string pitches, string 1 (highest) first.
    pub tuning: StringTuning,
    /// Highest playable fret.
    pub max_fret: u8,
    /// Width of the time buckets used to thin out pitch samples, in seconds.
    pub frame_interval: f32,
    /// Samples later than this many seconds are treated as malformed. Bounds
    /// the width of the tab grid.
    pub max_duration: f32,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            min_freq: 75.0,
            max_freq: 1400.0,
            tuning: StringTuning::standard(),
            max_fret: DEFAULT_MAX_FRET,
            frame_interval: 0.1,
            max_duration: 3600.0,
        }
    }
}

/// Settings for the character grid the tab is drawn on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabLayout {
    /// Grid columns per second of audio.
    pub columns_per_second: u32,
    /// Extra columns appended after the last event.
    pub margin_columns: usize,
    /// Row width used when there is nothing to place.
    pub empty_width: usize,
    /// Character filling unused cells.
    pub fill: char,
}

impl Default for TabLayout {
    fn default() -> Self {
        Self {
            columns_per_second: 10,
            margin_columns: 10,
            empty_width: 60,
            fill: '-',
        }
    }
}

/// Complete configuration of a transcription pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabConfig {
    pub instrument: InstrumentConfig,
    pub layout: TabLayout,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("frequency bounds must be finite with 0 < min < max, got {min}..{max}")]
    InvalidFrequencyRange { min: f32, max: f32 },
    #[error("frame interval must be a positive number of seconds, got {0}")]
    InvalidFrameInterval(f32),
    #[error("maximum duration must be a positive number of seconds, got {0}")]
    InvalidMaxDuration(f32),
    #[error("columns per second must be at least 1")]
    ZeroColumnsPerSecond,
    #[error("empty tab width must be at least 1")]
    ZeroEmptyWidth,
    #[error("fill character '{0}' would be indistinguishable from a fret number")]
    DigitFill(char),
}

impl TabConfig {
    /// Checks the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let InstrumentConfig {
            min_freq,
            max_freq,
            frame_interval,
            max_duration,
            ..
        } = self.instrument;
        let bounded = min_freq.is_finite() && max_freq.is_finite();
        if !(bounded && 0.0 < min_freq && min_freq < max_freq) {
            return Err(ConfigError::InvalidFrequencyRange {
                min: min_freq,
                max: max_freq,
            });
        }
        if !(frame_interval.is_finite() && frame_interval > 0.0) {
            return Err(ConfigError::InvalidFrameInterval(frame_interval));
        }
        if !(max_duration.is_finite() && max_duration > 0.0) {
            return Err(ConfigError::InvalidMaxDuration(max_duration));
        }
        if self.layout.columns_per_second == 0 {
            return Err(ConfigError::ZeroColumnsPerSecond);
        }
        if self.layout.empty_width == 0 {
            return Err(ConfigError::ZeroEmptyWidth);
        }
        if self.layout.fill.is_ascii_digit() {
            return Err(ConfigError::DigitFill(self.layout.fill));
        }
        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - File path to load the configuration from (e.g., "tab_config.json")
    ///
    /// # Returns
    /// * `Ok(TabConfig)` - Successfully loaded, valid configuration
    /// * `Err(e)` - I/O error, JSON error, or a failed validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: TabConfig = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}
