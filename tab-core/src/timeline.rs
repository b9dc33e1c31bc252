//! # Timeline Module
//!
//! Lays detections out on a fixed-width character grid, one row per string.
//!
//! ## Placement rules
//! - Row width is `floor(max_time * columns_per_second) + margin_columns`,
//!   or `empty_width` when there are no detections.
//! - A fret is written at column `floor(time * columns_per_second)`.
//! - Events landing in the last two columns are dropped. Multi-digit frets
//!   are dropped unless every digit fits before the final column.
//! - Writes overwrite whatever is already there, so of two events sharing a
//!   column on one string the later one wins.
//!
//! Grid memory grows linearly with the latest event time. Detections from
//! [`EventStreamBuilder`](crate::detection::EventStreamBuilder) never exceed
//! `max_duration`; callers building detections by hand must bound time
//! themselves.

use crate::config::TabLayout;
use crate::detection::Detection;
use crate::fretboard::STRING_COUNT;
use tracing::debug;

/// Six rows of characters, row 0 holding string 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGrid {
    rows: [Vec<char>; STRING_COUNT],
    width: usize,
}

impl TabGrid {
    /// A grid of `width` columns filled with `fill`.
    pub fn new(width: usize, fill: char) -> Self {
        Self {
            rows: std::array::from_fn(|_| vec![fill; width]),
            width,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Row contents in grid order, row 0 = string 1.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.iter().collect())
    }

    /// Contents of the row for a 1-based string index.
    pub fn row(&self, string: u8) -> Option<String> {
        let index = usize::from(string).checked_sub(1)?;
        self.rows.get(index).map(|row| row.iter().collect())
    }

    /// Overwrites `text` into the row of `string` starting at `column`.
    /// The caller guarantees the text fits.
    fn write(&mut self, string: u8, column: usize, text: &str) {
        let row = &mut self.rows[usize::from(string) - 1];
        for (cell, ch) in row[column..].iter_mut().zip(text.chars()) {
            *cell = ch;
        }
    }
}

/// Counts of what happened to each detection during placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlacementReport {
    /// Detections written into the grid (including ones later overwritten).
    pub placed: usize,
    /// Detections with no fretboard position.
    pub unplayable: usize,
    /// Detections dropped because they would run past the end of the grid.
    pub overflowed: usize,
}

/// Places detections onto a [`TabGrid`].
#[derive(Debug, Clone, Default)]
pub struct TabTimeline {
    layout: TabLayout,
}

impl TabTimeline {
    pub fn new(layout: TabLayout) -> Self {
        Self { layout }
    }

    /// Grid column for a point in time.
    pub fn column_for(&self, time: f32) -> Option<usize> {
        let column = (time * self.layout.columns_per_second as f32).floor();
        (column.is_finite() && column >= 0.0).then_some(column as usize)
    }

    /// Row width needed for `detections`.
    pub fn width_for(&self, detections: &[Detection]) -> usize {
        if detections.is_empty() {
            return self.layout.empty_width;
        }
        let max_time = detections
            .iter()
            .map(|d| d.time)
            .filter(|t| t.is_finite())
            .fold(0.0_f32, f32::max);
        self.column_for(max_time).unwrap_or(0) + self.layout.margin_columns
    }

    /// Builds the grid for `detections`, see the module docs for the rules.
    pub fn place(&self, detections: &[Detection]) -> TabGrid {
        self.place_with_report(detections).0
    }

    /// Like [`TabTimeline::place`], also reporting how many events were dropped.
    pub fn place_with_report(&self, detections: &[Detection]) -> (TabGrid, PlacementReport) {
        let width = self.width_for(detections);
        let mut grid = TabGrid::new(width, self.layout.fill);
        let mut report = PlacementReport::default();

        for detection in detections {
            let Some(position) = detection.position else {
                report.unplayable += 1;
                continue;
            };
            if !(1..=STRING_COUNT as u8).contains(&position.string) {
                debug!(
                    "[TIMELINE] Skipping {} on unknown string {}",
                    detection.note, position.string
                );
                report.unplayable += 1;
                continue;
            }
            let Some(column) = self.column_for(detection.time) else {
                report.overflowed += 1;
                continue;
            };

            let digits = position.fret.to_string();
            let fits = column + 2 < width && (digits.len() == 1 || column + digits.len() < width);
            if !fits {
                debug!(
                    "[TIMELINE] Dropping fret {} on string {} at column {} (width {})",
                    digits, position.string, column, width
                );
                report.overflowed += 1;
                continue;
            }

            grid.write(position.string, column, &digits);
            report.placed += 1;
        }

        (grid, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteIdentity;

    fn note(name: &str) -> NoteIdentity {
        name.parse().unwrap()
    }

    fn open_strings() -> Vec<Detection> {
        vec![
            Detection::placed(0.0, note("E2"), 6, 0),
            Detection::placed(0.5, note("A2"), 5, 0),
            Detection::placed(1.0, note("D3"), 4, 0),
            Detection::placed(1.5, note("G3"), 3, 0),
            Detection::placed(2.0, note("B3"), 2, 0),
            Detection::placed(2.5, note("E4"), 1, 0),
        ]
    }

    #[test]
    fn empty_input_gives_the_default_grid() {
        let grid = TabTimeline::default().place(&[]);
        assert_eq!(grid.width(), 60);
        assert!(grid.rows().all(|row| row == "-".repeat(60)));
    }

    #[test]
    fn width_follows_the_latest_event() {
        let timeline = TabTimeline::default();
        assert_eq!(timeline.width_for(&open_strings()), 35);
        // Events without a position still stretch the grid.
        let unplayable = Detection {
            position: None,
            ..Detection::placed(4.27, note("E6"), 1, 0)
        };
        assert_eq!(timeline.width_for(&[unplayable]), 52);
    }

    #[test]
    fn frets_land_in_their_string_rows() {
        let grid = TabTimeline::default().place(&open_strings());
        assert_eq!(grid.row(6).unwrap()[..6].to_string(), "0-----");
        assert_eq!(grid.row(5).unwrap().find('0'), Some(5));
        assert_eq!(grid.row(1).unwrap().find('0'), Some(25));
        assert!(grid.rows().all(|row| row.matches('0').count() == 1));
    }

    #[test]
    fn two_digit_frets_take_two_columns() {
        let grid = TabTimeline::default().place(&[Detection::placed(0.25, note("E5"), 1, 12)]);
        assert_eq!(grid.row(1).unwrap(), format!("--12{}", "-".repeat(8)));
    }

    fn with_margin(margin_columns: usize) -> TabTimeline {
        TabTimeline::new(TabLayout {
            margin_columns,
            ..TabLayout::default()
        })
    }

    #[test]
    fn events_in_the_last_two_columns_are_dropped() {
        // A 2-column margin leaves the latest event at column L - 2.
        let timeline = with_margin(2);
        let early = Detection::placed(0.75, note("B3"), 2, 0);
        let last = Detection::placed(1.0, note("G3"), 3, 0);
        let (grid, report) = timeline.place_with_report(&[early, last]);
        assert_eq!(grid.width(), 12);
        assert_eq!(grid.row(2).unwrap().find('0'), Some(7));
        assert_eq!(grid.row(3).unwrap(), "-".repeat(12));
        assert_eq!(report.overflowed, 1);
        assert_eq!(report.placed, 1);
    }

    #[test]
    fn two_digit_fret_one_column_before_the_end_is_dropped_not_truncated() {
        let timeline = with_margin(1);
        let late = Detection::placed(1.0, note("E5"), 1, 12);
        let (grid, report) = timeline.place_with_report(&[late]);
        assert_eq!(grid.width(), 11);
        let row = grid.row(1).unwrap();
        assert_eq!(row, "-".repeat(11));
        assert!(!row.contains('1'));
        assert_eq!(report.overflowed, 1);
    }

    #[test]
    fn two_digit_fret_fits_three_columns_before_the_end() {
        let timeline = with_margin(3);
        let late = Detection::placed(1.0, note("E5"), 1, 12);
        let grid = timeline.place(&[late]);
        assert_eq!(grid.width(), 13);
        assert!(grid.row(1).unwrap().ends_with("12-"));
    }

    #[test]
    fn default_margin_never_overflows() {
        let (_, report) = TabTimeline::default().place_with_report(&open_strings());
        assert_eq!(report.overflowed, 0);
        assert_eq!(report.placed, 6);
    }

    #[test]
    fn later_event_wins_a_shared_column() {
        let timeline = TabTimeline::default();
        let first = Detection::placed(1.02, note("F#4"), 1, 2);
        let second = Detection::placed(1.07, note("A4"), 1, 5);
        let (grid, report) = timeline.place_with_report(&[first, second]);
        let row = grid.row(1).unwrap();
        assert_eq!(row.chars().nth(10), Some('5'));
        assert!(!row.contains('2'));
        assert_eq!(report.placed, 2);
    }

    #[test]
    fn unplayable_events_are_skipped_and_counted() {
        let unplayable = Detection {
            position: None,
            ..Detection::placed(0.5, note("E6"), 1, 0)
        };
        let (grid, report) = TabTimeline::default().place_with_report(&[unplayable]);
        assert!(grid.rows().all(|row| !row.contains('0')));
        assert_eq!(report.unplayable, 1);
        assert_eq!(report.placed, 0);
    }

    #[test]
    fn custom_layout_scales_columns() {
        let timeline = TabTimeline::new(TabLayout {
            columns_per_second: 4,
            margin_columns: 3,
            empty_width: 8,
            fill: '.',
        });
        let grid = timeline.place(&[Detection::placed(1.0, note("A2"), 5, 0)]);
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.row(5).unwrap(), "....0..");
        assert_eq!(timeline.place(&[]).row(1).unwrap(), "........");
    }
}
