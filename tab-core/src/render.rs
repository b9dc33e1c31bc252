//! # Render Module
//!
//! Formats a [`TabGrid`] as plain-text tablature and writes it to disk.
//!
//! Each line reads `<letter>|<row>|`, joined by `\n` with no trailing
//! newline. Rows follow the grid's order, string 1 (highest pitch) on top.
//! Labels are read off the tuning low to high, string 6 first, so standard
//! tuning is labelled `E A D G B E` from the top line down. The two orders
//! are independent of each other.

use crate::config::TabLayout;
use crate::fretboard::StringTuning;
use crate::timeline::TabGrid;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Renders `grid` with labels taken from `tuning`, lowest string first.
pub fn render(grid: &TabGrid, tuning: &StringTuning) -> String {
    let labels: Vec<char> = tuning
        .strings()
        .map(|(_, open)| open.pitch_class.letter())
        .collect();
    labels
        .iter()
        .rev()
        .zip(grid.rows())
        .map(|(label, row)| format!("{label}|{row}|"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The tab shown before anything has been transcribed.
pub fn render_empty(layout: &TabLayout, tuning: &StringTuning) -> String {
    render(&TabGrid::new(layout.empty_width, layout.fill), tuning)
}

/// Writes rendered tab text verbatim to `path`.
///
/// # Returns
/// * `Ok(())` - File written
/// * `Err(e)` - The file could not be created or written; the error names the path
pub fn save_tab(text: &str, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, text).with_context(|| format!("failed to save tab to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_tab_has_six_bordered_dash_lines() {
        let text = render_empty(&TabLayout::default(), &StringTuning::standard());
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 6);
        for line in &lines {
            assert_eq!(line.len(), 62);
            assert!(line[1..].starts_with('|'));
            assert!(line.ends_with('|'));
            assert!(line[2..61].chars().all(|c| c == '-'));
        }
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn labels_run_low_to_high() {
        let text = render(&TabGrid::new(4, '-'), &StringTuning::standard());
        assert_eq!(
            text,
            ["E|----|", "A|----|", "D|----|", "G|----|", "B|----|", "E|----|"].join("\n")
        );
    }

    #[test]
    fn labels_come_from_the_tuning_in_reverse() {
        let tuning = StringTuning::try_from(
            ["D4", "A3", "F3", "C3", "G2", "C2"]
                .iter()
                .map(|n| n.parse().unwrap())
                .collect::<Vec<_>>(),
        )
        .unwrap();
        let labels: Vec<char> = render(&TabGrid::new(1, '-'), &tuning)
            .lines()
            .filter_map(|line| line.chars().next())
            .collect();
        assert_eq!(labels, vec!['C', 'G', 'C', 'F', 'A', 'D']);
    }

    #[test]
    fn saved_file_matches_the_rendered_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_tab.txt");
        let text = render_empty(&TabLayout::default(), &StringTuning::standard());
        save_tab(&text, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), text);
    }

    #[test]
    fn save_failure_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("tab.txt");
        let err = save_tab("E|-|", &path).unwrap_err();
        assert!(err.to_string().contains("failed to save tab"));
    }
}
