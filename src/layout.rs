//! Layout parsing for week-organized workout sheets.
//!
//! Row 0 names the week columns ("Week 1", "Week 2", ...). From row 2 on,
//! column 0 holds either a day marker ("Push", "Pull A", "Day 2") or an
//! exercise name; each week column starts a 5-cell block of
//! sets, reps, weight, completed flag and notes.

use std::sync::LazyLock;

use chrono::NaiveDate;
use clap::ValueEnum;
use log::debug;
use regex::Regex;

use crate::domain::{BlockEntry, RawSheet, SetCounter, SetRecord, WeekColumn, WorkoutDay};
use crate::names::ExerciseNameMap;
use crate::schedule::DatePolicy;

/// Default workout-type labels recognized as day markers.
pub const DEFAULT_WORKOUT_TYPES: &[&str] = &["Push", "Pull", "Legs", "Upper", "Lower", "Long Run"];

/// Header cells containing this marker are never week columns.
const SETUP_MARKER: &str = "Setup";

/// First data row; rows 0 and 1 are headers.
const FIRST_DATA_ROW: usize = 2;

static WEEK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)week\s*(\d+)").expect("week header pattern is a valid regex")
});

/// How column-0 text is compared against the workout-type labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatchMode {
    /// Cell equals a label.
    Exact,
    /// Cell equals a label, or is a label followed by a variant suffix
    /// ("Push A", "Pull-B", "Legs 2").
    #[default]
    Prefix,
    /// Cell contains a label anywhere.
    Substring,
}

/// Recognized day-marker labels and how they are matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerVocabulary {
    labels: Vec<String>,
    mode: MatchMode,
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_WORKOUT_TYPES.iter().map(|s| s.to_string()), MatchMode::default())
    }
}

impl MarkerVocabulary {
    pub fn new(labels: impl IntoIterator<Item = String>, mode: MatchMode) -> Self {
        Self {
            labels: labels.into_iter().collect(),
            mode,
        }
    }

    /// Returns the workout day if `cell` is a day marker.
    pub fn match_marker(&self, cell: &str) -> Option<WorkoutDay> {
        if cell.starts_with("Day") {
            return Some(WorkoutDay::new(cell, cell));
        }

        // Longest label wins so "Long Run" beats a shorter overlapping label
        self.labels
            .iter()
            .filter(|label| self.label_matches(cell, label))
            .max_by_key(|label| label.len())
            .map(|label| WorkoutDay::new(cell, label.as_str()))
    }

    fn label_matches(&self, cell: &str, label: &str) -> bool {
        if label.is_empty() {
            return false;
        }
        match self.mode {
            MatchMode::Exact => cell == label,
            MatchMode::Prefix => {
                cell == label || cell.strip_prefix(label).is_some_and(is_variant_suffix)
            }
            MatchMode::Substring => cell.contains(label),
        }
    }
}

/// A separator followed by a single uppercase letter or a number:
/// " A", "-B", "_2".
fn is_variant_suffix(rest: &str) -> bool {
    let mut chars = rest.chars();
    let Some(sep) = chars.next() else {
        return false;
    };
    if !matches!(sep, ' ' | '-' | '_') {
        return false;
    }
    let suffix = chars.as_str().trim_start();
    let single_letter = suffix.len() == 1 && suffix.chars().all(|c| c.is_ascii_uppercase());
    let number = !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit());
    single_letter || number
}

/// Options controlling how a sheet is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub vocabulary: MarkerVocabulary,
    /// Treat notes equal to "YES"/"NO" as empty.
    pub strip_boilerplate_notes: bool,
    /// Applied before set orders are counted, so names that map to the same
    /// exercise share one counter. Empty by default.
    pub exercise_names: ExerciseNameMap,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            vocabulary: MarkerVocabulary::default(),
            strip_boilerplate_notes: true,
            exercise_names: ExerciseNameMap::default(),
        }
    }
}

/// Result of scanning one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetScan {
    pub week_columns: Vec<WeekColumn>,
    pub entries: Vec<BlockEntry>,
}

impl SheetScan {
    /// Highest week number in the header (0 if none).
    pub fn max_week(&self) -> u32 {
        self.week_columns
            .iter()
            .map(|w| w.week_number)
            .max()
            .unwrap_or(0)
    }
}

/// Extracts the week number from a header like "Week 1" or "week10".
pub fn parse_week_number(header: &str) -> Option<u32> {
    WEEK_PATTERN
        .captures(header)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Finds the week columns in the header row, in column order.
///
/// "Setup" columns and "Week 0" are skipped. A repeated week number moves
/// to its last column but keeps the position where it was first seen.
pub fn scan_week_columns(header: &[String]) -> Vec<WeekColumn> {
    let mut columns: Vec<WeekColumn> = Vec::new();

    for (idx, cell) in header.iter().enumerate() {
        let cell = cell.trim();
        if cell.contains(SETUP_MARKER) {
            continue;
        }
        let Some(week_number) = parse_week_number(cell).filter(|n| *n > 0) else {
            continue;
        };
        if let Some(existing) = columns.iter_mut().find(|c| c.week_number == week_number) {
            debug!(
                "Duplicate week {} header, column {} replaces column {}",
                week_number, idx, existing.start_column
            );
            existing.start_column = idx;
            continue;
        }
        columns.push(WeekColumn {
            week_number,
            start_column: idx,
        });
    }

    columns
}

/// Scans a sheet into per-(exercise, week) block entries in row-then-week order.
pub fn scan_sheet(sheet: &RawSheet, options: &ParseOptions) -> SheetScan {
    let Some(header) = sheet.header() else {
        return SheetScan::default();
    };
    if sheet.len() < 2 {
        return SheetScan::default();
    }

    let week_columns = scan_week_columns(header);
    let mut entries = Vec::new();
    let mut current_day: Option<WorkoutDay> = None;

    for (row_idx, row) in sheet.rows().iter().enumerate().skip(FIRST_DATA_ROW) {
        let first_cell = row.first().map(|c| c.trim()).unwrap_or("");
        if first_cell.is_empty() {
            continue;
        }

        if let Some(day) = options.vocabulary.match_marker(first_cell) {
            current_day = Some(day);
            continue;
        }

        if first_cell == SETUP_MARKER {
            continue;
        }

        let Some(day) = &current_day else {
            debug!("Row {}: '{}' before any day marker, skipped", row_idx + 1, first_cell);
            continue;
        };

        for week in &week_columns {
            let Some(block) = read_block(row, week.start_column, options) else {
                continue;
            };
            entries.push(BlockEntry {
                week_number: week.week_number,
                workout_day: day.clone(),
                exercise_name: first_cell.to_string(),
                sets: block.sets,
                reps: block.reps,
                weight: block.weight,
                notes: block.notes,
            });
        }
    }

    SheetScan {
        week_columns,
        entries,
    }
}

/// The parsed 5-cell block of one exercise in one week.
#[derive(Debug, Clone, PartialEq)]
struct Block {
    sets: u32,
    reps: u32,
    weight: Option<f64>,
    notes: String,
}

/// Reads the block starting at `start`. Returns None if the block is filtered
/// out (no sets, no reps, or not completed).
fn read_block(row: &[String], start: usize, options: &ParseOptions) -> Option<Block> {
    let cell = |offset: usize| row.get(start + offset).map(|c| c.trim());

    let sets = cell(0)
        .and_then(|c| c.parse::<u32>().ok())
        .filter(|s| *s > 0)?;

    // Completed flag: a present cell must read TRUE, a missing cell counts as done
    if let Some(completed) = cell(3)
        && !completed.eq_ignore_ascii_case("TRUE")
    {
        return None;
    }

    let reps = cell(1)
        .and_then(|c| c.parse::<u32>().ok())
        .filter(|r| *r > 0)?;

    let weight = cell(2).and_then(parse_weight);

    let notes = match cell(4) {
        Some(n) if options.strip_boilerplate_notes && is_boilerplate_note(n) => String::new(),
        Some(n) => n.to_string(),
        None => String::new(),
    };

    Some(Block {
        sets,
        reps,
        weight,
        notes,
    })
}

/// Parses a weight cell. Empty, "N/A" and non-numeric cells have no weight.
fn parse_weight(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("N/A") {
        return None;
    }
    cell.parse::<f64>().ok().filter(|w| w.is_finite())
}

fn is_boilerplate_note(notes: &str) -> bool {
    notes.eq_ignore_ascii_case("YES") || notes.eq_ignore_ascii_case("NO")
}

/// Dates the block entries and expands each into `sets` set records.
///
/// Exercise names are mapped through `names` first. Set order continues per
/// (date, workout name, mapped exercise name) through `counter`; notes are
/// kept on the first set of each block only. Entries whose workout day has
/// no date under `policy` are dropped.
pub fn expand_entries(
    scan: &SheetScan,
    policy: &DatePolicy,
    names: &ExerciseNameMap,
    workout_prefix: &str,
    counter: &mut SetCounter,
) -> Vec<SetRecord> {
    let detected_weeks = scan.max_week();
    let mut records = Vec::new();

    for entry in &scan.entries {
        let Some(date) = policy.date_for(entry.week_number, &entry.workout_day, detected_weeks)
        else {
            debug!(
                "No schedule day for '{}' (week {}), skipped {}",
                entry.workout_day.name, entry.week_number, entry.exercise_name
            );
            continue;
        };

        let name = workout_name(workout_prefix, &entry.workout_day);
        let exercise = names.canonical(&entry.exercise_name);
        records.extend(expand_entry(entry, date, &name, exercise, counter));
    }

    records
}

fn expand_entry(
    entry: &BlockEntry,
    date: NaiveDate,
    workout_name: &str,
    exercise_name: &str,
    counter: &mut SetCounter,
) -> Vec<SetRecord> {
    (0..entry.sets)
        .map(|set_idx| SetRecord {
            date,
            workout_name: workout_name.to_string(),
            exercise_name: exercise_name.to_string(),
            set_order: counter.next(date, workout_name, exercise_name),
            weight: entry.weight.unwrap_or(0.0),
            reps: entry.reps,
            notes: if set_idx == 0 {
                entry.notes.clone()
            } else {
                String::new()
            },
        })
        .collect()
}

/// Builds the workout name shown in the app, e.g. "PPL - Push A".
pub fn workout_name(prefix: &str, day: &WorkoutDay) -> String {
    if prefix.is_empty() {
        day.name.clone()
    } else {
        format!("{} - {}", prefix, day.name)
    }
}

/// Scans a sheet and expands it into dated set records with a fresh counter.
pub fn extract_sets(
    sheet: &RawSheet,
    options: &ParseOptions,
    policy: &DatePolicy,
    workout_prefix: &str,
) -> Vec<SetRecord> {
    let scan = scan_sheet(sheet, options);
    let mut counter = SetCounter::new();
    expand_entries(&scan, policy, &options.exercise_names, workout_prefix, &mut counter)
}
