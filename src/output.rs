//! Strong CSV output: ordering and serialization of set records.

use std::io::Write;
use std::path::Path;

use chrono::NaiveTime;
use clap::ValueEnum;
use csv::{QuoteStyle, WriterBuilder};

use crate::domain::SetRecord;
use crate::error::OutputError;

/// Header of the Strong export format.
pub const STRONG_HEADER: [&str; 14] = [
    "Date",
    "Workout Name",
    "Exercise Name",
    "Set Order",
    "Weight",
    "Weight Unit",
    "Reps",
    "RPE",
    "Distance",
    "Distance Unit",
    "Seconds",
    "Notes",
    "Workout Notes",
    "Workout Duration",
];

/// Header of the minimal comma-delimited format.
pub const BASIC_HEADER: [&str; 7] = [
    "Date",
    "Workout Name",
    "Exercise Name",
    "Weight",
    "Reps",
    "RPE",
    "Notes",
];

pub const WEIGHT_UNIT: &str = "lbs";
pub const WORKOUT_DURATION: &str = "1h";
const EMPTY_NOTES: &str = "-";

/// Output file layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Dialect {
    /// Semicolon-delimited Strong export with timestamps.
    #[default]
    Strong,
    /// Comma-delimited, required columns only, date without time.
    Basic,
}

/// Settings for writing the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    pub dialect: Dialect,
    /// Time of day stamped on every Strong date.
    pub time_of_day: NaiveTime,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            time_of_day: default_time_of_day(),
        }
    }
}

/// 17:30:00, used for every workout.
pub fn default_time_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 30, 0).unwrap_or(NaiveTime::MIN)
}

/// What `write_output` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was written with this many set rows.
    Written(usize),
    /// No records; the output file was left untouched.
    NothingToWrite,
}

/// Sorts by (date, workout, exercise, set order).
///
/// The sort is stable, so records with equal keys keep their input order.
pub fn prepare_records(mut records: Vec<SetRecord>) -> Vec<SetRecord> {
    records.sort_by(|a, b| {
        (a.date, &a.workout_name, &a.exercise_name, a.set_order).cmp(&(
            b.date,
            &b.workout_name,
            &b.exercise_name,
            b.set_order,
        ))
    });
    records
}

/// Serializes already-prepared records with a header row.
pub fn write_records<W: Write>(
    writer: W,
    records: &[SetRecord],
    options: &OutputOptions,
) -> Result<(), csv::Error> {
    let delimiter = match options.dialect {
        Dialect::Strong => b';',
        Dialect::Basic => b',',
    };
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    match options.dialect {
        Dialect::Strong => writer.write_record(STRONG_HEADER)?,
        Dialect::Basic => writer.write_record(BASIC_HEADER)?,
    }

    for record in records {
        match options.dialect {
            Dialect::Strong => writer.write_record(strong_row(record, options.time_of_day))?,
            Dialect::Basic => writer.write_record(basic_row(record))?,
        }
    }

    writer.flush()?;
    Ok(())
}

fn strong_row(record: &SetRecord, time_of_day: NaiveTime) -> [String; 14] {
    let notes = if record.notes.is_empty() {
        EMPTY_NOTES.to_string()
    } else {
        record.notes.clone()
    };

    [
        record.date.and_time(time_of_day).format("%Y-%m-%d %H:%M:%S").to_string(),
        record.workout_name.clone(),
        record.exercise_name.clone(),
        record.set_order.to_string(),
        record.weight.to_string(),
        WEIGHT_UNIT.to_string(),
        record.reps.to_string(),
        String::new(),
        String::new(),
        String::new(),
        "0".to_string(),
        notes,
        EMPTY_NOTES.to_string(),
        WORKOUT_DURATION.to_string(),
    ]
}

fn basic_row(record: &SetRecord) -> [String; 7] {
    [
        record.date.format("%Y-%m-%d").to_string(),
        record.workout_name.clone(),
        record.exercise_name.clone(),
        record.weight.to_string(),
        record.reps.to_string(),
        String::new(),
        record.notes.clone(),
    ]
}

/// Sorts and writes all records to `path`.
///
/// Nothing is created or overwritten when `records` is empty.
pub fn write_output(
    path: &Path,
    records: Vec<SetRecord>,
    options: &OutputOptions,
) -> Result<WriteOutcome, OutputError> {
    if records.is_empty() {
        return Ok(WriteOutcome::NothingToWrite);
    }

    let records = prepare_records(records);
    let file = std::fs::File::create(path).map_err(|e| OutputError::Write {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    write_records(std::io::BufWriter::new(file), &records, options).map_err(|source| {
        OutputError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    Ok(WriteOutcome::Written(records.len()))
}
