//! # Notes Display
//!
//! Lists the detections behind the current tab, one line per note.

use iced::widget::{column, container, scrollable, text, Column};
use iced::{Element, Length};
use tab_core::Detection;

/// Shown when an analysis found nothing.
pub const NO_NOTES_HINT: &str = "No notes detected. Try recording again with clearer audio.";

/// One-line summary of a detection, e.g.
/// `Time: 1.20s, Note: A2, String 5, Fret 0`.
pub fn describe_detection(detection: &Detection) -> String {
    let position = match detection.position {
        Some(p) => format!("String {}, Fret {}", p.string, p.fret),
        None => "Unknown position".to_string(),
    };
    format!("Time: {:.2}s, Note: {}, {}", detection.time, detection.note, position)
}

/// Creates the detected-notes panel.
pub fn view<'a>(notes: &'a [String], analyzed: bool) -> Element<'a, crate::Message> {
    let lines: Element<'a, crate::Message> = if analyzed && notes.is_empty() {
        text(NO_NOTES_HINT).into()
    } else {
        Column::with_children(notes.iter().map(|line| text(line).size(13).into()))
            .spacing(2)
            .into()
    };

    container(
        column![
            text("Detected Notes").size(18),
            scrollable(lines).width(Length::Fill).height(Length::Fixed(120.0)),
        ]
        .spacing(6),
    )
    .padding(10)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tab_core::{NoteIdentity, PitchClass};

    #[test]
    fn describes_placed_and_unplaced_notes() {
        let a2 = NoteIdentity::new(PitchClass::A, 2);
        let placed = Detection::placed(1.2, a2, 5, 0);
        assert_eq!(
            describe_detection(&placed),
            "Time: 1.20s, Note: A2, String 5, Fret 0"
        );

        let unplaced = Detection {
            position: None,
            ..placed
        };
        assert_eq!(
            describe_detection(&unplaced),
            "Time: 1.20s, Note: A2, Unknown position"
        );
    }
}
