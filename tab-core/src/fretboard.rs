//! # Fretboard Module
//!
//! Maps notes onto the six strings of a guitar.
//!
//! String indices follow tablature convention: string 1 is the highest
//! pitched (thinnest) string and string 6 the lowest. The same index selects
//! the tab grid row, so row 0 always holds string 1.

use crate::note::{NoteIdentity, PitchClass};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of strings on the instrument.
pub const STRING_COUNT: usize = 6;

/// Highest fret considered playable by default.
pub const DEFAULT_MAX_FRET: u8 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("a tuning needs exactly 6 strings, got {0}")]
    WrongStringCount(usize),
}

/// Open-string pitches ordered from string 1 (highest) to string 6 (lowest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<NoteIdentity>", into = "Vec<NoteIdentity>")]
pub struct StringTuning {
    strings: [NoteIdentity; STRING_COUNT],
}

impl StringTuning {
    pub fn new(strings: [NoteIdentity; STRING_COUNT]) -> Self {
        Self { strings }
    }

    /// Standard tuning, E4 B3 G3 D3 A2 E2.
    pub fn standard() -> Self {
        Self::new([
            NoteIdentity::new(PitchClass::E, 4),
            NoteIdentity::new(PitchClass::B, 3),
            NoteIdentity::new(PitchClass::G, 3),
            NoteIdentity::new(PitchClass::D, 3),
            NoteIdentity::new(PitchClass::A, 2),
            NoteIdentity::new(PitchClass::E, 2),
        ])
    }

    /// Open note of a 1-based string index.
    pub fn open_note(&self, string: u8) -> Option<NoteIdentity> {
        let index = usize::from(string).checked_sub(1)?;
        self.strings.get(index).copied()
    }

    /// Strings in lookup order as `(string index, open note)`, string 1 first.
    pub fn strings(&self) -> impl Iterator<Item = (u8, NoteIdentity)> + '_ {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, &note)| (i as u8 + 1, note))
    }
}

impl Default for StringTuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<NoteIdentity>> for StringTuning {
    type Error = TuningError;

    fn try_from(notes: Vec<NoteIdentity>) -> Result<Self, Self::Error> {
        let count = notes.len();
        let strings: [NoteIdentity; STRING_COUNT] = notes
            .try_into()
            .map_err(|_| TuningError::WrongStringCount(count))?;
        Ok(Self::new(strings))
    }
}

impl From<StringTuning> for Vec<NoteIdentity> {
    fn from(tuning: StringTuning) -> Self {
        tuning.strings.to_vec()
    }
}

/// A playable spot on the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FretPosition {
    /// 1-based string index, 1 = highest pitched string.
    pub string: u8,
    /// Semitones above the open string.
    pub fret: u8,
}

/// Assigns notes to strings with a fixed-priority greedy search.
///
/// Strings are tried from string 1 down to string 6 and the first string on
/// which the note lies between the open string and `max_fret` is chosen.
/// No attempt is made to minimise hand movement between consecutive notes.
#[derive(Debug, Clone)]
pub struct FretboardMapper {
    tuning: StringTuning,
    max_fret: u8,
}

impl FretboardMapper {
    pub fn new(tuning: StringTuning, max_fret: u8) -> Self {
        Self { tuning, max_fret }
    }

    /// Finds the playable position for `note`.
    ///
    /// # Returns
    /// * `Some(position)` - First string, in priority order, that can play the note
    /// * `None` - The note is below every open string or beyond `max_fret` on all of them
    pub fn map(&self, note: NoteIdentity) -> Option<FretPosition> {
        self.tuning.strings().find_map(|(string, open)| {
            let offset = note.semitones_above(open);
            (0..=i32::from(self.max_fret))
                .contains(&offset)
                .then(|| FretPosition {
                    string,
                    fret: offset as u8,
                })
        })
    }
}

impl Default for FretboardMapper {
    fn default() -> Self {
        Self::new(StringTuning::standard(), DEFAULT_MAX_FRET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(name: &str) -> NoteIdentity {
        name.parse().unwrap()
    }

    #[test]
    fn open_strings_map_to_fret_zero_on_their_own_string() {
        let mapper = FretboardMapper::default();
        for (name, string) in [("E4", 1), ("B3", 2), ("G3", 3), ("D3", 4), ("A2", 5), ("E2", 6)] {
            assert_eq!(
                mapper.map(note(name)),
                Some(FretPosition { string, fret: 0 }),
                "{name}"
            );
        }
    }

    #[test]
    fn highest_string_wins_when_several_fit() {
        // C4 fits on B3 (fret 1), G3 (fret 5), D3 (fret 10), A2 (fret 15);
        // the greedy search stops at the B string.
        let mapper = FretboardMapper::default();
        assert_eq!(mapper.map(note("C4")), Some(FretPosition { string: 2, fret: 1 }));
    }

    #[test]
    fn high_notes_use_upper_frets_of_string_one() {
        let mapper = FretboardMapper::default();
        assert_eq!(mapper.map(note("G5")), Some(FretPosition { string: 1, fret: 15 }));
        assert_eq!(mapper.map(note("E5")), Some(FretPosition { string: 1, fret: 12 }));
    }

    #[test]
    fn notes_beyond_the_fret_span_are_unplayable() {
        let mapper = FretboardMapper::default();
        assert_eq!(mapper.map(note("G#5")), None);
        assert_eq!(mapper.map(note("D#2")), None);
    }

    #[test]
    fn smaller_fret_span_shifts_notes_to_lower_strings() {
        let mapper = FretboardMapper::new(StringTuning::standard(), 4);
        // F#3 sits below the top three strings, and D3 + 4 frets reaches it.
        assert_eq!(mapper.map(note("F#3")), Some(FretPosition { string: 4, fret: 4 }));
        assert_eq!(mapper.map(note("C3")), Some(FretPosition { string: 5, fret: 3 }));
        assert_eq!(mapper.map(note("E5")), None);
    }

    #[test]
    fn mapping_is_deterministic() {
        let mapper = FretboardMapper::default();
        for (n, _) in crate::tuning::FrequencyTable::build(75.0, 1400.0).entries() {
            assert_eq!(mapper.map(*n), mapper.map(*n));
        }
    }

    #[test]
    fn tuning_round_trips_through_json() {
        let json = serde_json::to_string(&StringTuning::standard()).unwrap();
        assert_eq!(json, r#"["E4","B3","G3","D3","A2","E2"]"#);
        let back: StringTuning = serde_json::from_str(&json).unwrap();
        assert_eq!(back, StringTuning::standard());
    }

    #[test]
    fn tuning_needs_six_strings() {
        let err = serde_json::from_str::<StringTuning>(r#"["E4","B3"]"#).unwrap_err();
        assert!(err.to_string().contains("exactly 6 strings"));
        assert_eq!(
            StringTuning::try_from(vec![note("E2")]),
            Err(TuningError::WrongStringCount(1))
        );
    }

    #[test]
    fn open_note_uses_one_based_indices() {
        let tuning = StringTuning::standard();
        assert_eq!(tuning.open_note(1), Some(note("E4")));
        assert_eq!(tuning.open_note(6), Some(note("E2")));
        assert_eq!(tuning.open_note(0), None);
        assert_eq!(tuning.open_note(7), None);
    }
}
