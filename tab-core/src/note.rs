//! # Note Module
//!
//! Pitch classes and octave-qualified note identities shared by every stage
//! of the transcription pipeline.
//!
//! ## Features
//! - The 12 chromatic pitch classes with sharp spellings
//! - Parsing of note names with sharps or flats ("C#3", "Bb2", "E4")
//! - Semitone arithmetic between notes
//! - Serde support using the note name as the serialized form

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the twelve pitch classes of the chromatic scale, starting at C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in ascending chromatic order.
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Position of the pitch class within the octave (C = 0, B = 11).
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Pitch class for a semitone index; wraps around the octave.
    pub fn from_index(index: i32) -> PitchClass {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Sharp spelling of the pitch class, e.g. "F#".
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }

    /// The bare letter of the sharp spelling ('F' for "F#").
    pub fn letter(self) -> char {
        match self {
            PitchClass::C | PitchClass::CSharp => 'C',
            PitchClass::D | PitchClass::DSharp => 'D',
            PitchClass::E => 'E',
            PitchClass::F | PitchClass::FSharp => 'F',
            PitchClass::G | PitchClass::GSharp => 'G',
            PitchClass::A | PitchClass::ASharp => 'A',
            PitchClass::B => 'B',
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced while parsing a note or pitch class name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNoteError {
    #[error("note name is empty")]
    Empty,
    #[error("unknown note letter '{0}'")]
    UnknownLetter(char),
    #[error("unknown accidental \"{0}\"")]
    UnknownAccidental(String),
    #[error("missing or invalid octave in \"{0}\"")]
    InvalidOctave(String),
}

/// Parses a letter plus optional accidental into a semitone offset from C.
/// The result may fall outside 0..12 for spellings such as "Cb" or "B#".
fn parse_pitch_offset(s: &str) -> Result<i32, ParseNoteError> {
    let mut chars = s.chars();
    let letter = chars.next().ok_or(ParseNoteError::Empty)?;
    let base = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        other => return Err(ParseNoteError::UnknownLetter(other)),
    };
    let accidental = match chars.as_str() {
        "" => 0,
        "#" => 1,
        "b" => -1,
        other => return Err(ParseNoteError::UnknownAccidental(other.to_string())),
    };
    Ok(base + accidental)
}

/// Octaves accepted when parsing a note name.
pub const OCTAVE_RANGE: std::ops::RangeInclusive<i32> = -1..=10;

/// A concrete note: pitch class plus octave in scientific pitch notation.
///
/// Serialized as its name, e.g. `"C#3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteIdentity {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl NoteIdentity {
    pub fn new(pitch_class: PitchClass, octave: i32) -> Self {
        Self { pitch_class, octave }
    }

    /// Absolute semitone number counted from C0.
    pub fn semitone(self) -> i32 {
        self.octave * 12 + self.pitch_class.index()
    }

    /// Note for an absolute semitone number counted from C0.
    pub fn from_semitone(semitone: i32) -> Self {
        Self {
            pitch_class: PitchClass::from_index(semitone),
            octave: semitone.div_euclid(12),
        }
    }

    /// Signed number of semitones from `base` up to `self`.
    pub fn semitones_above(self, base: NoteIdentity) -> i32 {
        (self.octave - base.octave) * 12 + (self.pitch_class.index() - base.pitch_class.index())
    }
}

impl fmt::Display for NoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

impl FromStr for NoteIdentity {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseNoteError::Empty);
        }
        // The octave starts at the first digit or minus sign after the letter.
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_digit() || *c == '-')
            .map(|(i, _)| i)
            .ok_or_else(|| ParseNoteError::InvalidOctave(s.to_string()))?;
        let (pitch, octave) = s.split_at(split);
        let offset = parse_pitch_offset(pitch)?;
        let octave = octave
            .parse::<i32>()
            .ok()
            .filter(|o| OCTAVE_RANGE.contains(o))
            .ok_or_else(|| ParseNoteError::InvalidOctave(s.to_string()))?;
        Ok(NoteIdentity::from_semitone(octave * 12 + offset))
    }
}

impl TryFrom<String> for NoteIdentity {
    type Error = ParseNoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoteIdentity> for String {
    fn from(note: NoteIdentity) -> Self {
        note.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sharps_and_naturals() {
        assert_eq!("E2".parse::<NoteIdentity>(), Ok(NoteIdentity::new(PitchClass::E, 2)));
        assert_eq!("C#3".parse::<NoteIdentity>(), Ok(NoteIdentity::new(PitchClass::CSharp, 3)));
    }

    #[test]
    fn flats_are_respelled_as_sharps() {
        let note: NoteIdentity = "Bb2".parse().unwrap();
        assert_eq!(note, NoteIdentity::new(PitchClass::ASharp, 2));
        assert_eq!(note.to_string(), "A#2");
    }

    #[test]
    fn cb_crosses_the_octave_boundary() {
        let note: NoteIdentity = "Cb4".parse().unwrap();
        assert_eq!(note, NoteIdentity::new(PitchClass::B, 3));
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!("".parse::<NoteIdentity>(), Err(ParseNoteError::Empty));
        assert_eq!(
            "H2".parse::<NoteIdentity>(),
            Err(ParseNoteError::UnknownLetter('H'))
        );
        assert!(matches!(
            "E".parse::<NoteIdentity>(),
            Err(ParseNoteError::InvalidOctave(_))
        ));
        assert!(matches!(
            "Ex2".parse::<NoteIdentity>(),
            Err(ParseNoteError::UnknownAccidental(_))
        ));
    }

    #[test]
    fn octaves_outside_the_supported_range_are_rejected() {
        for name in ["C999999999", "E-2", "A11", "G99999999999"] {
            assert_eq!(
                name.parse::<NoteIdentity>(),
                Err(ParseNoteError::InvalidOctave(name.to_string())),
                "{name}"
            );
        }
        assert_eq!("C-1".parse::<NoteIdentity>(), Ok(NoteIdentity::new(PitchClass::C, -1)));
        assert_eq!("B10".parse::<NoteIdentity>(), Ok(NoteIdentity::new(PitchClass::B, 10)));
    }

    #[test]
    fn semitone_distance_spans_octaves() {
        let e2 = NoteIdentity::new(PitchClass::E, 2);
        let g3 = NoteIdentity::new(PitchClass::G, 3);
        assert_eq!(g3.semitones_above(e2), 15);
        assert_eq!(e2.semitones_above(g3), -15);
        assert_eq!(NoteIdentity::from_semitone(g3.semitone()), g3);
    }

    #[test]
    fn letters_drop_the_accidental() {
        assert_eq!(PitchClass::FSharp.letter(), 'F');
        assert_eq!(PitchClass::E.letter(), 'E');
    }

    #[test]
    fn serializes_as_note_name() {
        let note = NoteIdentity::new(PitchClass::GSharp, 4);
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, "\"G#4\"");
        let back: NoteIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, note);
    }
}
