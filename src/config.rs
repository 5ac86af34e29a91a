//! Run configuration: lookup tables, per-file settings and input discovery.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use log::info;
use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::layout::{DEFAULT_WORKOUT_TYPES, MarkerVocabulary, MatchMode};
use crate::names::ExerciseNameMap;
use crate::schedule::{
    Anchor, DEFAULT_CYCLE_DAYS, DatePolicy, DayOffsets, Schedule, builtin_schedules,
};

static FILENAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2})").expect("file name date pattern is a valid regex")
});

/// Direction in which dates are assigned from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AnchorMode {
    /// Anchor is the start of week 1.
    #[default]
    Forward,
    /// Anchor is the date of the last workout.
    Backward,
}

impl std::str::FromStr for AnchorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "start" => Ok(AnchorMode::Forward),
            "backward" | "end" => Ok(AnchorMode::Backward),
            other => Err(other.to_string()),
        }
    }
}

/// Lookup tables: exercise names, schedules and the day-marker vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct Tables {
    pub exercise_names: ExerciseNameMap,
    pub schedules: BTreeMap<String, Schedule>,
    pub workout_types: Vec<String>,
}

/// On-disk form of a tables file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TablesFile {
    exercise_names: BTreeMap<String, String>,
    schedules: BTreeMap<String, Schedule>,
    labels: Option<LabelsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LabelsFile {
    workout_types: Vec<String>,
}

impl Default for Tables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Tables {
    /// The built-in tables.
    pub fn builtin() -> Self {
        Self {
            exercise_names: ExerciseNameMap::builtin(),
            schedules: builtin_schedules(),
            workout_types: DEFAULT_WORKOUT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Merges a TOML tables file over these tables.
    pub fn merge_str(mut self, text: &str) -> Result<Self, String> {
        let file: TablesFile = toml::from_str(text).map_err(|e| e.to_string())?;

        for (name, schedule) in &file.schedules {
            if schedule.cycle_days == 0 {
                return Err(format!("schedule '{}' has cycle_days = 0", name));
            }
            if let Some(anchor) = &schedule.anchor
                && !schedule.days.contains_key(anchor)
            {
                return Err(format!("schedule '{}' anchor '{}' is not one of its days", name, anchor));
            }
        }

        self.exercise_names.extend(file.exercise_names);
        self.schedules.extend(file.schedules);
        if let Some(labels) = file.labels {
            self.workout_types = labels.workout_types;
        }
        Ok(self)
    }

    /// Built-in tables merged with the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Tables {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::builtin()
            .merge_str(&text)
            .map_err(|reason| ConfigError::Tables {
                path: path.to_path_buf(),
                reason,
            })
    }

    pub fn schedule(&self, name: &str) -> Result<&Schedule, ConfigError> {
        self.schedules
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSchedule(name.to_string()))
    }

    pub fn vocabulary(&self, mode: MatchMode) -> MarkerVocabulary {
        MarkerVocabulary::new(self.workout_types.iter().cloned(), mode)
    }
}

/// Day placement within the cycle for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayPlacement {
    /// Same day offset for every workout type.
    Offset(u32),
    /// Per-workout-type positions from a named schedule.
    Schedule(String),
}

/// Global settings that per-file configuration falls back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Explicit direction; otherwise backward iff an end date is given.
    pub mode: Option<AnchorMode>,
    pub workout_name: String,
    pub placement: DayPlacement,
    pub cycle_days: Option<u32>,
    pub total_weeks: Option<u32>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            mode: None,
            workout_name: "Workout".to_string(),
            placement: DayPlacement::Offset(0),
            cycle_days: None,
            total_weeks: None,
        }
    }
}

impl Defaults {
    pub fn mode(&self) -> AnchorMode {
        match self.mode {
            Some(mode) => mode,
            None if self.end_date.is_some() => AnchorMode::Backward,
            None => AnchorMode::Forward,
        }
    }

    /// The globally configured anchor date for the effective mode.
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        match self.mode() {
            AnchorMode::Forward => self.start_date.or(self.end_date),
            AnchorMode::Backward => self.end_date.or(self.start_date),
        }
    }
}

/// Settings for converting one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub path: PathBuf,
    pub anchor_date: NaiveDate,
    pub mode: AnchorMode,
    pub workout_name: String,
    pub placement: DayPlacement,
    pub cycle_days: Option<u32>,
    pub total_weeks: Option<u32>,
}

impl FileConfig {
    /// Builds the date policy for this file from the lookup tables.
    pub fn date_policy(&self, tables: &Tables) -> Result<DatePolicy, ConfigError> {
        let (offsets, schedule_cycle) = match &self.placement {
            DayPlacement::Offset(offset) => (DayOffsets::Uniform(*offset), DEFAULT_CYCLE_DAYS),
            DayPlacement::Schedule(name) => {
                let schedule = tables.schedule(name)?;
                (DayOffsets::Table(schedule.clone()), schedule.cycle_days)
            }
        };

        let cycle_days = self.cycle_days.unwrap_or(schedule_cycle);
        if cycle_days == 0 {
            return Err(ConfigError::InvalidCycle(cycle_days));
        }

        let anchor = match self.mode {
            AnchorMode::Forward => Anchor::Forward {
                start: self.anchor_date,
            },
            AnchorMode::Backward => Anchor::Backward {
                end: self.anchor_date,
                total_weeks: self.total_weeks,
            },
        };

        Ok(DatePolicy {
            anchor,
            offsets,
            cycle_days,
        })
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn parse_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M:%S").map_err(|_| ConfigError::InvalidTime {
        value: value.to_string(),
    })
}

/// Parses a day placement: an integer offset or a schedule name.
pub fn parse_placement(value: &str) -> DayPlacement {
    let value = value.trim();
    match value.parse::<u32>() {
        Ok(offset) => DayPlacement::Offset(offset),
        Err(_) => DayPlacement::Schedule(value.to_string()),
    }
}

/// Parses `path,date[,workout_name[,schedule_or_day_offset[,mode[,cycle_days]]]]`.
///
/// Empty or omitted optional fields take the values from `defaults`.
pub fn parse_file_config(value: &str, defaults: &Defaults) -> Result<FileConfig, ConfigError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() < 2 || parts[0].is_empty() {
        return Err(ConfigError::MalformedFileConfig {
            value: value.to_string(),
        });
    }

    let field = |idx: usize| parts.get(idx).copied().filter(|p| !p.is_empty());
    let invalid = |field: &'static str, bad: &str| ConfigError::InvalidFileConfigField {
        config: value.to_string(),
        field,
        value: bad.to_string(),
    };

    let anchor_date = parse_date(parts[1])?;
    let workout_name = field(2)
        .map(str::to_string)
        .unwrap_or_else(|| defaults.workout_name.clone());
    let placement = field(3)
        .map(parse_placement)
        .unwrap_or_else(|| defaults.placement.clone());
    let mode = match field(4) {
        Some(m) => m.parse::<AnchorMode>().map_err(|_| invalid("mode", m))?,
        None => defaults.mode(),
    };
    let cycle_days = match field(5) {
        Some(c) => Some(c.parse::<u32>().map_err(|_| invalid("cycle_days", c))?),
        None => defaults.cycle_days,
    };

    Ok(FileConfig {
        path: PathBuf::from(parts[0]),
        anchor_date,
        mode,
        workout_name,
        placement,
        cycle_days,
        total_weeks: defaults.total_weeks,
    })
}

/// Extracts a YYYY-MM-DD date from a file name.
pub fn date_from_file_name(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    FILENAME_DATE
        .captures_iter(name)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

/// Workout name and schedule implied by a file name, if any.
pub fn infer_from_file_name(path: &Path) -> Option<(&'static str, &'static str)> {
    let name = path.file_stem()?.to_str()?.to_lowercase();
    if name.contains("ppl_ab") || name.contains("ppl-ab") {
        Some(("PPL", "ppl-ab"))
    } else if name.contains("ppl") {
        Some(("PPL", "ppl"))
    } else if name.contains("upper") || name.contains("lower") {
        Some(("Upper/Lower", "upper-lower"))
    } else if name.contains("run") {
        Some(("Running", "run"))
    } else {
        None
    }
}

/// Anchor date for a file: the global date, else one in the file name.
fn anchor_for(path: &Path, defaults: &Defaults) -> Result<NaiveDate, ConfigError> {
    defaults
        .anchor_date()
        .or_else(|| date_from_file_name(path))
        .ok_or_else(|| ConfigError::MissingAnchorDate(path.display().to_string()))
}

/// Configures explicitly listed input files with the global settings.
pub fn configs_for_files(
    files: &[PathBuf],
    defaults: &Defaults,
) -> Result<Vec<FileConfig>, ConfigError> {
    files
        .iter()
        .map(|path| {
            Ok(FileConfig {
                path: path.clone(),
                anchor_date: anchor_for(path, defaults)?,
                mode: defaults.mode(),
                workout_name: defaults.workout_name.clone(),
                placement: defaults.placement.clone(),
                cycle_days: defaults.cycle_days,
                total_weeks: defaults.total_weeks,
            })
        })
        .collect()
}

/// Configures a file found by directory discovery, inferring workout name and
/// schedule from its name.
pub fn infer_file_config(path: &Path, defaults: &Defaults) -> Result<FileConfig, ConfigError> {
    let anchor_date = anchor_for(path, defaults)?;
    let (workout_name, placement) = match infer_from_file_name(path) {
        Some((name, schedule)) => {
            info!("{}: inferred workout '{}' with schedule '{}'", path.display(), name, schedule);
            (name.to_string(), DayPlacement::Schedule(schedule.to_string()))
        }
        None => (defaults.workout_name.clone(), defaults.placement.clone()),
    };

    Ok(FileConfig {
        path: path.to_path_buf(),
        anchor_date,
        mode: defaults.mode(),
        workout_name,
        placement,
        cycle_days: defaults.cycle_days,
        total_weeks: defaults.total_weeks,
    })
}

/// Lists the .csv and .xlsx files in `dir`, sorted by path.
pub fn discover_input_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::InputDirNotFound(dir.to_path_buf()));
    }

    let entries =
        std::fs::read_dir(dir).map_err(|_| ConfigError::InputDirNotFound(dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("xlsx"))
        })
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkoutDay;
    use std::fs;
    use tempfile::TempDir;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_parse_file_config_minimal() {
        let config = parse_file_config("old_format/ppl.csv,2026-01-05", &Defaults::default()).unwrap();
        assert_eq!(config.path, PathBuf::from("old_format/ppl.csv"));
        assert_eq!(config.anchor_date, date(2026, 1, 5));
        assert_eq!(config.mode, AnchorMode::Forward);
        assert_eq!(config.workout_name, "Workout");
        assert_eq!(config.placement, DayPlacement::Offset(0));
    }

    #[test]
    fn test_parse_file_config_all_fields() {
        let config =
            parse_file_config("a.csv, 2025-07-05, PPL, ppl-ab, backward, 8", &Defaults::default())
                .unwrap();
        assert_eq!(config.workout_name, "PPL");
        assert_eq!(config.placement, DayPlacement::Schedule("ppl-ab".to_string()));
        assert_eq!(config.mode, AnchorMode::Backward);
        assert_eq!(config.cycle_days, Some(8));
    }

    #[test]
    fn test_parse_file_config_day_offset() {
        let config = parse_file_config("a.csv,2026-01-05,Run,6", &Defaults::default()).unwrap();
        assert_eq!(config.placement, DayPlacement::Offset(6));
    }

    #[test]
    fn test_parse_file_config_errors() {
        let defaults = Defaults::default();
        assert!(matches!(
            parse_file_config("a.csv", &defaults),
            Err(ConfigError::MalformedFileConfig { .. })
        ));
        assert!(matches!(
            parse_file_config(",2026-01-05", &defaults),
            Err(ConfigError::MalformedFileConfig { .. })
        ));
        assert!(matches!(
            parse_file_config("a.csv,01/05/2026", &defaults),
            Err(ConfigError::InvalidDate { .. })
        ));
        assert!(matches!(
            parse_file_config("a.csv,2026-01-05,PPL,ppl,sideways", &defaults),
            Err(ConfigError::InvalidFileConfigField { field: "mode", .. })
        ));
        assert!(matches!(
            parse_file_config("a.csv,2026-01-05,PPL,ppl,forward,x", &defaults),
            Err(ConfigError::InvalidFileConfigField {
                field: "cycle_days",
                ..
            })
        ));
    }

    #[test]
    fn test_defaults_mode_follows_end_date() {
        let defaults = Defaults {
            end_date: Some(date(2025, 7, 5)),
            ..Defaults::default()
        };
        assert_eq!(defaults.mode(), AnchorMode::Backward);
        assert_eq!(defaults.anchor_date(), Some(date(2025, 7, 5)));

        let config = parse_file_config("a.csv,2025-07-05", &defaults).unwrap();
        assert_eq!(config.mode, AnchorMode::Backward);
    }

    #[test]
    fn test_date_from_file_name() {
        assert_eq!(
            date_from_file_name(Path::new("old_format/ppl_2026-01-05.csv")),
            Some(date(2026, 1, 5))
        );
        assert_eq!(date_from_file_name(Path::new("old_format/ppl.csv")), None);
        assert_eq!(date_from_file_name(Path::new("2026-13-45.csv")), None);
    }

    #[test]
    fn test_infer_from_file_name() {
        assert_eq!(infer_from_file_name(Path::new("PPL_AB Program.csv")), Some(("PPL", "ppl-ab")));
        assert_eq!(infer_from_file_name(Path::new("ppl.csv")), Some(("PPL", "ppl")));
        assert_eq!(
            infer_from_file_name(Path::new("Upper Lower.xlsx")),
            Some(("Upper/Lower", "upper-lower"))
        );
        assert_eq!(infer_from_file_name(Path::new("marathon_run.csv")), Some(("Running", "run")));
        assert_eq!(infer_from_file_name(Path::new("misc.csv")), None);
    }

    #[test]
    fn test_missing_anchor_date() {
        let result = configs_for_files(&[PathBuf::from("ppl.csv")], &Defaults::default());
        assert!(matches!(result, Err(ConfigError::MissingAnchorDate(_))));

        let inferred =
            configs_for_files(&[PathBuf::from("ppl 2026-01-05.csv")], &Defaults::default()).unwrap();
        assert_eq!(inferred[0].anchor_date, date(2026, 1, 5));
    }

    #[test]
    fn test_infer_file_config_uses_schedule() {
        let defaults = Defaults {
            start_date: Some(date(2026, 1, 5)),
            ..Defaults::default()
        };
        let config = infer_file_config(Path::new("old_format/ppl.csv"), &defaults).unwrap();
        assert_eq!(config.workout_name, "PPL");
        assert_eq!(config.placement, DayPlacement::Schedule("ppl".to_string()));

        let plain = infer_file_config(Path::new("old_format/misc.csv"), &defaults).unwrap();
        assert_eq!(plain.workout_name, "Workout");
        assert_eq!(plain.placement, DayPlacement::Offset(0));
    }

    #[test]
    fn test_discover_input_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.xlsx"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("sub.csv")).unwrap();

        let files = discover_input_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.csv"]);

        assert!(matches!(
            discover_input_files(&dir.path().join("missing")),
            Err(ConfigError::InputDirNotFound(_))
        ));
    }

    #[test]
    fn test_date_policy_from_schedule() {
        let config = parse_file_config("a.csv,2025-07-05,PPL,ppl-ab,backward", &Defaults::default())
            .unwrap();
        let policy = config.date_policy(&Tables::builtin()).unwrap();
        assert_eq!(policy.cycle_days, 8);
        assert_eq!(
            policy.anchor,
            Anchor::Backward {
                end: date(2025, 7, 5),
                total_weeks: None
            }
        );

        let unknown = parse_file_config("a.csv,2025-07-05,PPL,nope", &Defaults::default()).unwrap();
        assert!(matches!(
            unknown.date_policy(&Tables::builtin()),
            Err(ConfigError::UnknownSchedule(_))
        ));

        let zero = parse_file_config("a.csv,2025-07-05,PPL,0,forward,0", &Defaults::default()).unwrap();
        assert!(matches!(
            zero.date_policy(&Tables::builtin()),
            Err(ConfigError::InvalidCycle(0))
        ));
    }

    #[test]
    fn test_forward_ppl_ab_file_config_lands_on_mondays() {
        let config = parse_file_config("a.csv,2026-01-05,PPL,ppl-ab,forward", &Defaults::default())
            .unwrap();
        let policy = config.date_policy(&Tables::builtin()).unwrap();
        let push_a = WorkoutDay::new("Push A", "Push");

        assert_eq!(policy.date_for(1, &push_a, 2), Some(date(2026, 1, 5)));
        assert_eq!(policy.date_for(2, &push_a, 2), Some(date(2026, 1, 12)));
    }

    #[test]
    fn test_tables_merge() {
        let tables = Tables::builtin()
            .merge_str(
                r#"
                [exercise_names]
                "Good Morning" = "Good Morning (Barbell)"

                [schedules.bro-split]
                cycle_days = 7
                anchor = "Arms"
                days = { Chest = 0, Back = 1, Arms = 4 }

                [labels]
                workout_types = ["Chest", "Back", "Arms"]
                "#,
            )
            .unwrap();

        assert_eq!(tables.exercise_names.canonical("Good Morning"), "Good Morning (Barbell)");
        assert_eq!(tables.exercise_names.canonical("DB Row"), "Dumbbell Row");
        assert_eq!(tables.schedule("bro-split").unwrap().anchor_position(), Some(4));
        assert!(tables.schedule("ppl").is_ok());
        assert_eq!(tables.workout_types, vec!["Chest", "Back", "Arms"]);
    }

    #[test]
    fn test_tables_merge_rejects_bad_schedule() {
        let zero = Tables::builtin().merge_str("[schedules.x]\ncycle_days = 0\ndays = { Push = 0 }\n");
        assert!(zero.is_err());

        let anchor =
            Tables::builtin().merge_str("[schedules.x]\ncycle_days = 7\nanchor = \"Legs\"\ndays = { Push = 0 }\n");
        assert!(anchor.is_err());

        assert!(Tables::builtin().merge_str("[unknown]\nx = 1\n").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("06:15:00").unwrap(), NaiveTime::from_hms_opt(6, 15, 0).unwrap());
        assert!(parse_time("6pm").is_err());
    }
}
