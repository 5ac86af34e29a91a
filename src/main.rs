mod calendar;
mod config;
mod domain;
mod error;
mod layout;
mod names;
mod output;
mod schedule;
mod sheet;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};

use crate::calendar::WorkoutCalendar;
use crate::config::{
    AnchorMode, DayPlacement, Defaults, FileConfig, Tables, configs_for_files,
    discover_input_files, infer_file_config, parse_date, parse_file_config, parse_time,
};
use crate::domain::SetRecord;
use crate::layout::{MatchMode, ParseOptions, extract_sets};
use crate::output::{Dialect, OutputOptions, WriteOutcome, write_output};
use crate::schedule::DatePolicy;
use crate::sheet::load_sheet;

/// Converts week-by-week workout spreadsheets into a Strong CSV for Hevy import.
#[derive(Parser, Debug)]
#[command(name = "strong-migrate")]
#[command(about = "Convert week-organized workout spreadsheets to Strong CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert input sheets into one merged Strong CSV.
    Convert(ConvertArgs),
    /// Show the workouts of a Strong CSV as a calendar.
    Calendar(CalendarArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input CSV/XLSX files. Defaults to every file in the input directory.
    #[arg(value_name = "FILE")]
    input_files: Vec<PathBuf>,

    /// Output file.
    #[arg(
        short,
        long,
        default_value = "historical_workouts.csv",
        env = "STRONG_MIGRATE_OUTPUT"
    )]
    output: PathBuf,

    /// Start date of week 1 (YYYY-MM-DD); dates are assigned forward.
    #[arg(short, long, value_parser = parse_date, conflicts_with = "end_date")]
    start_date: Option<NaiveDate>,

    /// Date of the last workout (YYYY-MM-DD); dates are assigned backward.
    #[arg(short, long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,

    /// Force the dating direction instead of deriving it from the date flag.
    #[arg(long, value_enum)]
    anchor: Option<AnchorMode>,

    /// Workout name prefix, shown as "<name> - <day>".
    #[arg(short, long, default_value = "Workout")]
    workout_name: String,

    /// Day of the cycle for every workout: 0=Mon ... 6=Sun.
    #[arg(short, long, default_value_t = 0, conflicts_with = "schedule")]
    day_offset: u32,

    /// Named schedule placing each workout type on its own day.
    #[arg(long)]
    schedule: Option<String>,

    /// Cycle length in days for backward dating (overrides the schedule's).
    #[arg(long)]
    cycle_days: Option<u32>,

    /// Total weeks for backward dating (default: highest week in the sheet).
    #[arg(long)]
    total_weeks: Option<u32>,

    /// Per-file config: filepath,date[,workout_name[,schedule_or_day_offset[,mode[,cycle_days]]]]
    #[arg(short = 'f', long = "file-config", value_name = "CONFIG")]
    file_configs: Vec<String>,

    /// TOML file with extra exercise names, schedules and day labels.
    #[arg(long, env = "STRONG_MIGRATE_TABLES")]
    tables: Option<PathBuf>,

    /// Directory scanned when no inputs are given.
    #[arg(long, default_value = "old_format", env = "STRONG_MIGRATE_INPUT_DIR")]
    input_dir: PathBuf,

    /// How day-marker rows are matched against workout types.
    #[arg(long, value_enum, default_value_t = MatchMode::Prefix)]
    match_mode: MatchMode,

    /// Keep notes that just say YES or NO.
    #[arg(long)]
    keep_boilerplate_notes: bool,

    /// Time of day written with every date (HH:MM:SS).
    #[arg(long, default_value = "17:30:00", value_parser = parse_time)]
    time: NaiveTime,

    /// Output layout.
    #[arg(long, value_enum, default_value_t = Dialect::Strong)]
    dialect: Dialect,
}

impl ConvertArgs {
    fn defaults(&self) -> Defaults {
        let placement = match &self.schedule {
            Some(name) => DayPlacement::Schedule(name.clone()),
            None => DayPlacement::Offset(self.day_offset),
        };
        Defaults {
            start_date: self.start_date,
            end_date: self.end_date,
            mode: self.anchor,
            workout_name: self.workout_name.clone(),
            placement,
            cycle_days: self.cycle_days,
            total_weeks: self.total_weeks,
        }
    }
}

#[derive(Args, Debug)]
struct CalendarArgs {
    /// Strong CSV produced by `convert`.
    #[arg(value_name = "FILE", default_value = "historical_workouts.csv")]
    input: PathBuf,

    /// Only show workouts on or after this date.
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Only show workouts on or before this date.
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Show summary statistics.
    #[arg(long)]
    summary: bool,

    /// Find gaps of N or more days without workouts.
    #[arg(long, value_name = "N")]
    gaps: Option<i64>,
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => run_convert(&args).map(|_| ()),
        Command::Calendar(args) => run_calendar(&args),
    }
}

/// Converts every configured file and writes the merged output.
fn run_convert(args: &ConvertArgs) -> Result<WriteOutcome> {
    let tables = match &args.tables {
        Some(path) => Tables::load(path)?,
        None => Tables::builtin(),
    };

    log::debug!(
        "{} exercise names, {} schedules, {} workout types",
        tables.exercise_names.len(),
        tables.schedules.len(),
        tables.workout_types.len()
    );

    let configs = resolve_file_configs(args)?;

    // Resolve every policy before touching any input
    let plans: Vec<(FileConfig, DatePolicy)> = configs
        .into_iter()
        .map(|config| -> Result<(FileConfig, DatePolicy)> {
            let policy = config.date_policy(&tables)?;
            Ok((config, policy))
        })
        .collect::<Result<_>>()?;

    let options = ParseOptions {
        vocabulary: tables.vocabulary(args.match_mode),
        strip_boilerplate_notes: !args.keep_boilerplate_notes,
        exercise_names: tables.exercise_names.clone(),
    };

    let mut all_records = Vec::new();
    for (config, policy) in &plans {
        let records = convert_file(config, policy, &options)?;
        println!("Processed {}: {} sets", config.path.display(), records.len());
        all_records.extend(records);
    }

    let output_options = OutputOptions {
        dialect: args.dialect,
        time_of_day: args.time,
    };
    let outcome = write_output(&args.output, all_records, &output_options)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    match outcome {
        WriteOutcome::Written(count) => {
            println!();
            println!("Total: {} sets written to {}", count, args.output.display());
        }
        WriteOutcome::NothingToWrite => {
            log::warn!(
                "No sets found in {} input file(s); {} not written",
                plans.len(),
                args.output.display()
            );
            println!("No workouts found.");
        }
    }

    Ok(outcome)
}

/// Picks per-file configs, explicit files, or directory discovery, in that order.
fn resolve_file_configs(args: &ConvertArgs) -> Result<Vec<FileConfig>> {
    let defaults = args.defaults();

    if !args.file_configs.is_empty() {
        if !args.input_files.is_empty() {
            log::warn!("Input files are ignored when --file-config is given");
        }
        return args
            .file_configs
            .iter()
            .map(|value| parse_file_config(value, &defaults).map_err(anyhow::Error::from))
            .collect();
    }

    if !args.input_files.is_empty() {
        return Ok(configs_for_files(&args.input_files, &defaults)?);
    }

    let files = discover_input_files(&args.input_dir)?;
    println!("Found {} input files in {}", files.len(), args.input_dir.display());

    files
        .iter()
        .map(|path| infer_file_config(path, &defaults).map_err(anyhow::Error::from))
        .collect()
}

/// Loads one sheet and expands it into dated sets.
fn convert_file(
    config: &FileConfig,
    policy: &DatePolicy,
    options: &ParseOptions,
) -> Result<Vec<SetRecord>> {
    let sheet = load_sheet(&config.path)
        .with_context(|| format!("Failed to load {}", config.path.display()))?;

    if sheet.is_empty() {
        log::warn!("{} has no rows", config.path.display());
    }

    log::debug!(
        "{}: {} rows, anchor {} ({:?})",
        config.path.display(),
        sheet.len(),
        config.anchor_date,
        config.mode
    );

    Ok(extract_sets(&sheet, options, policy, &config.workout_name))
}

fn run_calendar(args: &CalendarArgs) -> Result<()> {
    let calendar = WorkoutCalendar::load(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    if args.summary {
        print!("{}", calendar.render_summary());
    }

    if let Some(min_gap) = args.gaps {
        print!("{}", calendar.render_gaps(min_gap));
    }

    if !args.summary && args.gaps.is_none() {
        print!("{}", calendar.render_calendar(args.start, args.end));
    }

    Ok(())
}
