//! Domain types for week-organized workout logs and the sets they expand into.

use std::collections::HashMap;

use chrono::NaiveDate;

/// A source spreadsheet as rows of text cells.
///
/// Row 0 holds the column headers ("Week 1", "Week 2", ...), row 1 the
/// sub-headers. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Creates a sheet from already-read rows.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the header row, if present.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A "Week N" column and where its 5-cell block starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekColumn {
    pub week_number: u32,
    pub start_column: usize,
}

/// The workout context set by a day-marker row ("Push", "Pull A", "Day 2").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutDay {
    /// Full marker text as written in the sheet.
    pub name: String,
    /// Vocabulary label the marker matched ("Pull" for "Pull A").
    /// Equal to `name` for "Day N" markers and exact matches.
    pub label: String,
}

impl WorkoutDay {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// One surviving (exercise row, week) block before it is dated and expanded
/// into individual sets.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEntry {
    pub week_number: u32,
    pub workout_day: WorkoutDay,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    /// None when the cell was empty, "N/A" or not a number.
    pub weight: Option<f64>,
    pub notes: String,
}

/// A single performed set, one row of the Strong CSV output.
#[derive(Debug, Clone, PartialEq)]
pub struct SetRecord {
    pub date: NaiveDate,
    pub workout_name: String,
    pub exercise_name: String,
    pub set_order: u32,
    pub weight: f64,
    pub reps: u32,
    pub notes: String,
}

/// Running set-order counters keyed by (date, workout name, exercise name).
///
/// Owned by a single file's conversion; the next file starts from a fresh
/// counter.
#[derive(Debug, Clone, Default)]
pub struct SetCounter {
    last: HashMap<(NaiveDate, String, String), u32>,
}

impl SetCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next set order for the key, starting at 1.
    pub fn next(&mut self, date: NaiveDate, workout_name: &str, exercise_name: &str) -> u32 {
        let counter = self
            .last
            .entry((date, workout_name.to_string(), exercise_name.to_string()))
            .or_insert(0);
        *counter += 1;
        *counter
    }
}
