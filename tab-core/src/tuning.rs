//! # Musical Tuning Module
//!
//! This module provides the equal-tempered frequency table for the guitar's
//! playable range and the nearest-note classifier built on top of it.
//!
//! ## Features
//! - Equal temperament frequency table, octaves 2 to 6, from C0 = 16.35 Hz
//! - Range limiting to the instrument's frequency bounds
//! - Nearest-note lookup by absolute frequency distance

use crate::note::{NoteIdentity, PitchClass};

/// Reference frequency of C0 in Hz. Every table entry is derived from it.
pub const C0_FREQUENCY: f32 = 16.35;

/// Octaves scanned when building the table (inclusive).
const OCTAVES: std::ops::RangeInclusive<i32> = 2..=6;

/// Equal-tempered frequency of a note relative to [`C0_FREQUENCY`].
pub fn equal_tempered_frequency(note: NoteIdentity) -> f32 {
    C0_FREQUENCY * 2.0_f32.powf(note.octave as f32 + note.pitch_class.index() as f32 / 12.0)
}

/// Range-limited mapping from note identity to frequency.
///
/// Entries are stored in octave-ascending, then pitch-class-ascending order.
/// The order is part of the contract: nearest-note ties resolve to the entry
/// encountered first.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    entries: Vec<(NoteIdentity, f32)>,
}

impl FrequencyTable {
    /// Builds the table for octaves 2 through 6, keeping only the notes whose
    /// frequency lies within `[min_freq, max_freq]`.
    ///
    /// # Arguments
    /// * `min_freq` - Lowest playable frequency in Hz (inclusive)
    /// * `max_freq` - Highest playable frequency in Hz (inclusive)
    pub fn build(min_freq: f32, max_freq: f32) -> Self {
        let entries = OCTAVES
            .flat_map(|octave| {
                PitchClass::ALL
                    .iter()
                    .map(move |&pitch_class| NoteIdentity::new(pitch_class, octave))
            })
            .map(|note| (note, equal_tempered_frequency(note)))
            .filter(|&(_, freq)| (min_freq..=max_freq).contains(&freq))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[(NoteIdentity, f32)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Frequency of `note`, if the note is inside the table's range.
    pub fn frequency_of(&self, note: NoteIdentity) -> Option<f32> {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == note)
            .map(|&(_, freq)| freq)
    }
}

/// Classifies frequencies as the nearest note in a [`FrequencyTable`].
#[derive(Debug, Clone)]
pub struct NoteClassifier {
    table: FrequencyTable,
}

impl NoteClassifier {
    pub fn new(table: FrequencyTable) -> Self {
        Self { table }
    }

    /// Builds a classifier over a freshly built table for the given bounds.
    pub fn for_range(min_freq: f32, max_freq: f32) -> Self {
        Self::new(FrequencyTable::build(min_freq, max_freq))
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// Finds the closest table note to a given frequency.
    ///
    /// Frequencies outside the table's range still resolve to the closest
    /// available entry. Among equally distant entries the first one in table
    /// order wins.
    ///
    /// # Returns
    /// * `Some((note, target_frequency))` - Closest note and its table frequency
    /// * `None` - Frequency is not positive and finite, or the table is empty
    pub fn nearest(&self, frequency: f32) -> Option<(NoteIdentity, f32)> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return None;
        }
        let mut best: Option<(NoteIdentity, f32)> = None;
        let mut best_distance = f32::INFINITY;
        for &(note, target) in &self.table.entries {
            let distance = (frequency - target).abs();
            if distance < best_distance {
                best_distance = distance;
                best = Some((note, target));
            }
        }
        best
    }

    /// Closest note identity for `frequency`, see [`NoteClassifier::nearest`].
    pub fn classify(&self, frequency: f32) -> Option<NoteIdentity> {
        self.nearest(frequency).map(|(note, _)| note)
    }
}
