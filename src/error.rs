//! Error types for the strong-migrate application.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading a source spreadsheet.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("cannot read file: {0}")]
    CannotRead(String),

    #[error("invalid workbook format: {0}")]
    InvalidFormat(String),

    #[error("unsupported input file type: {0}")]
    UnsupportedType(String),
}

/// Errors in the run configuration. Any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("invalid time of day '{value}' (expected HH:MM:SS)")]
    InvalidTime { value: String },

    #[error(
        "invalid file config '{value}': expected filepath,date[,workout_name[,schedule_or_day_offset[,mode[,cycle_days]]]]"
    )]
    MalformedFileConfig { value: String },

    #[error("invalid {field} '{value}' in file config '{config}'")]
    InvalidFileConfigField {
        config: String,
        field: &'static str,
        value: String,
    },

    #[error("no anchor date for {0}: pass --start-date/--end-date or put YYYY-MM-DD in the file name")]
    MissingAnchorDate(String),

    #[error("unknown schedule: {0}")]
    UnknownSchedule(String),

    #[error("cycle length must be at least 1 day, got {0}")]
    InvalidCycle(u32),

    #[error("input directory not found: {}", .0.display())]
    InputDirNotFound(PathBuf),

    #[error("cannot read tables file {}: {reason}", .path.display())]
    Tables { path: PathBuf, reason: String },
}

/// Errors that can occur while writing or reading the Strong CSV output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("missing column '{column}' in {}", .path.display())]
    MissingColumn { path: PathBuf, column: String },
}
