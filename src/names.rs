//! Exercise name mapping to the target app's exercise vocabulary.

use std::collections::BTreeMap;

/// Spreadsheet names and the canonical exercise names they map to.
const DEFAULT_EXERCISE_NAMES: &[(&str, &str)] = &[
    ("Bench", "Bench Press (Barbell)"),
    ("Bench Press", "Bench Press (Barbell)"),
    ("Incline DB Press", "Incline Bench Press (Dumbbell)"),
    ("DB Bench", "Bench Press (Dumbbell)"),
    ("OHP", "Overhead Press (Barbell)"),
    ("Overhead Press", "Overhead Press (Barbell)"),
    ("DB Row", "Dumbbell Row"),
    ("Barbell Row", "Bent Over Row (Barbell)"),
    ("Pull Ups", "Pull Up"),
    ("Pullups", "Pull Up"),
    ("Chin Ups", "Chin Up"),
    ("Lat Pulldown", "Lat Pulldown (Cable)"),
    ("Face Pulls", "Face Pull"),
    ("Tricep Pushdown", "Triceps Pushdown"),
    ("DB Curl", "Bicep Curl (Dumbbell)"),
    ("Lateral Raises", "Lateral Raise (Dumbbell)"),
    ("Squat", "Squat (Barbell)"),
    ("Deadlift", "Deadlift (Barbell)"),
    ("RDL", "Romanian Deadlift (Barbell)"),
    ("Leg Press", "Leg Press (Machine)"),
    ("Leg Curl", "Lying Leg Curl (Machine)"),
    ("Leg Extension", "Leg Extension (Machine)"),
    ("Hip Thrust", "Hip Thrust (Barbell)"),
    ("Calf Raises", "Standing Calf Raise"),
    ("Long Run", "Running"),
];

/// Exact-match name table. Unlisted names pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseNameMap {
    names: BTreeMap<String, String>,
}

impl ExerciseNameMap {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            names: DEFAULT_EXERCISE_NAMES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }

    /// Adds or replaces entries.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.names.extend(entries);
    }

    /// Returns the canonical name for `name`.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.names.get(name).map(String::as_str).unwrap_or(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
