//! Calendar view of a produced Strong CSV, for checking the assigned dates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use log::debug;

use crate::error::OutputError;

const RULE_WIDTH: usize = 80;

/// Workout names grouped by the date they were performed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkoutCalendar {
    by_date: BTreeMap<NaiveDate, BTreeSet<String>>,
}

/// A stretch of days without any workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: i64,
}

impl WorkoutCalendar {
    /// Builds a calendar from (date, workout name) pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, S)>,
        S: Into<String>,
    {
        let mut by_date: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();
        for (date, workout) in entries {
            by_date.entry(date).or_default().insert(workout.into());
        }
        Self { by_date }
    }

    /// Reads a semicolon-delimited Strong CSV.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let read_err = |source: csv::Error| OutputError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(read_err)?;

        let headers = reader.headers().map_err(read_err)?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| OutputError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let date_col = column("Date")?;
        let workout_col = column("Workout Name")?;

        let mut entries = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(read_err)?;
            let date_text = record
                .get(date_col)
                .and_then(|d| d.split_whitespace().next())
                .unwrap_or("");
            let Ok(date) = NaiveDate::parse_from_str(date_text, "%Y-%m-%d") else {
                debug!("Row {}: unreadable date '{}', skipped", row_idx + 2, date_text);
                continue;
            };
            let workout = record.get(workout_col).unwrap_or("").to_string();
            entries.push((date, workout));
        }

        Ok(Self::from_entries(entries))
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }

    /// Number of distinct workout days.
    pub fn workout_days(&self) -> usize {
        self.by_date.len()
    }

    /// First and last workout date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.by_date.keys().next()?;
        let last = self.by_date.keys().next_back()?;
        Some((*first, *last))
    }

    /// Number of days each workout name appears on.
    pub fn workout_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for workouts in self.by_date.values() {
            for workout in workouts {
                *counts.entry(workout.as_str()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Gaps of at least `min_gap_days` rest days between consecutive workouts.
    pub fn find_gaps(&self, min_gap_days: i64) -> Vec<Gap> {
        let dates: Vec<NaiveDate> = self.by_date.keys().copied().collect();
        dates
            .windows(2)
            .filter_map(|pair| {
                let days = (pair[1] - pair[0]).num_days() - 1;
                (days >= min_gap_days).then_some(Gap {
                    from: pair[0],
                    to: pair[1],
                    days,
                })
            })
            .collect()
    }

    /// Month-grouped listing, optionally limited to [start, end].
    pub fn render_calendar(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
        if self.is_empty() {
            return "No workouts found.\n".to_string();
        }

        let dates: Vec<(&NaiveDate, &BTreeSet<String>)> = self
            .by_date
            .iter()
            .filter(|(d, _)| start.is_none_or(|s| **d >= s) && end.is_none_or(|e| **d <= e))
            .collect();

        let (Some((first, _)), Some((last, _))) = (dates.first(), dates.last()) else {
            return format!(
                "No workouts found between {} and {}\n",
                describe(start),
                describe(end)
            );
        };

        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "WORKOUT CALENDAR VIEW");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Date Range: {} to {}", first, last);
        let _ = writeln!(out, "Total Workout Days: {}", dates.len());
        let _ = writeln!(out, "{rule}\n");

        let mut current_month: Option<String> = None;
        for (date, workouts) in dates {
            let month = date.format("%B %Y").to_string();
            if current_month.as_deref() != Some(month.as_str()) {
                if current_month.is_some() {
                    let _ = writeln!(out);
                }
                let _ = writeln!(out, "\n{}", month);
                let _ = writeln!(out, "{}", "-".repeat(60));
                current_month = Some(month);
            }

            let names: Vec<&str> = workouts.iter().map(String::as_str).collect();
            let _ = writeln!(
                out,
                "{} ({:>3}): {}",
                date,
                date.format("%a"),
                names.join(", ")
            );
        }

        out
    }

    /// Summary statistics: range, workout and rest days, per-workout counts.
    pub fn render_summary(&self) -> String {
        let Some((first, last)) = self.date_range() else {
            return "No workouts found.\n".to_string();
        };

        let total_days = (last - first).num_days() + 1;
        let workout_days = self.workout_days() as i64;
        let rule = "=".repeat(RULE_WIDTH);

        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "SUMMARY STATISTICS");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Date Range: {} to {}", first, last);
        let _ = writeln!(out, "Total Days in Range: {}", total_days);
        let _ = writeln!(out, "Workout Days: {}", workout_days);
        let _ = writeln!(out, "Rest Days: {}", total_days - workout_days);
        let _ = writeln!(out, "\nWorkout Type Breakdown:");
        for (workout, count) in self.workout_counts() {
            let _ = writeln!(out, "  {}: {} days", workout, count);
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    /// Listing of gaps of at least `min_gap_days` days.
    pub fn render_gaps(&self, min_gap_days: i64) -> String {
        if self.workout_days() < 2 {
            return String::new();
        }

        let gaps = self.find_gaps(min_gap_days);
        if gaps.is_empty() {
            return format!("\nNo gaps of {}+ days found.\n", min_gap_days);
        }

        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "\n{rule}");
        let _ = writeln!(out, "GAPS ({}+ days without workouts)", min_gap_days);
        let _ = writeln!(out, "{rule}");
        for gap in gaps {
            let _ = writeln!(out, "{} to {}: {} day gap", gap.from, gap.to, gap.days);
        }
        let _ = writeln!(out, "{rule}");
        out
    }
}

fn describe(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
