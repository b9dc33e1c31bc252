// tab-core/src/lib.rs

//! The core logic for the guitar tab generator.
//! This crate turns detected pitches into guitar tablature: it classifies
//! frequencies as notes, finds a string and fret for each note and lays the
//! result out as text. It also holds the audio collaborators (capture, WAV
//! files, pitch tracking). It is completely headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod detection;
pub mod fft;
pub mod fretboard;
pub mod note;
pub mod pitch;
pub mod render;
pub mod timeline;
pub mod transcriber;
pub mod tuning;
pub mod wav;

pub use audio::Recording;
pub use config::{InstrumentConfig, TabConfig, TabLayout};
pub use detection::{Detection, EventStreamBuilder, PitchSample};
pub use fretboard::{FretPosition, FretboardMapper, StringTuning};
pub use note::{NoteIdentity, PitchClass};
pub use timeline::{PlacementReport, TabGrid, TabTimeline};
pub use transcriber::{Transcriber, Transcription};
pub use tuning::{FrequencyTable, NoteClassifier};
