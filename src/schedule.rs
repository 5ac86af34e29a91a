//! Week-number to calendar-date assignment.
//!
//! Source sheets only carry relative week numbers. A date is computed either
//! forward from a known first day (the Monday of the start date's week, one
//! calendar week per sheet week) or backward from a known last workout, using
//! a repeating cycle of workout days.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;

use crate::domain::WorkoutDay;

/// Default cycle length: one calendar week.
pub const DEFAULT_CYCLE_DAYS: u32 = 7;

/// Days between consecutive weeks in forward mode.
pub const DAYS_PER_WEEK: i64 = 7;

/// A repeating cycle mapping workout types to their day position.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Schedule {
    pub cycle_days: u32,
    /// Workout type dated by the backward anchor date. Defaults to the
    /// type with the highest day position.
    #[serde(default)]
    pub anchor: Option<String>,
    pub days: BTreeMap<String, u32>,
}

impl Schedule {
    pub fn new(cycle_days: u32, days: &[(&str, u32)]) -> Self {
        Self {
            cycle_days,
            anchor: None,
            days: days.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    /// Looks up a day by full marker text, then by its vocabulary label.
    pub fn position(&self, day: &WorkoutDay) -> Option<u32> {
        self.days
            .get(&day.name)
            .or_else(|| self.days.get(&day.label))
            .copied()
    }

    /// Day position of the workout type the backward anchor date belongs to.
    pub fn anchor_position(&self) -> Option<u32> {
        match &self.anchor {
            Some(name) => self.days.get(name).copied(),
            None => self.days.values().copied().max(),
        }
    }
}

/// Built-in schedule presets, keyed by name.
pub fn builtin_schedules() -> BTreeMap<String, Schedule> {
    let presets = [
        ("ppl", Schedule::new(7, &[("Push", 0), ("Pull", 1), ("Legs", 2)])),
        (
            "upper-lower",
            Schedule::new(
                7,
                &[
                    ("Upper", 0),
                    ("Lower", 1),
                    ("Upper A", 0),
                    ("Lower A", 1),
                    ("Upper B", 3),
                    ("Lower B", 4),
                ],
            ),
        ),
        (
            "ppl-ul",
            Schedule::new(
                7,
                &[("Push", 0), ("Pull", 1), ("Legs", 2), ("Upper", 4), ("Lower", 5)],
            ),
        ),
        (
            "ppl-ab",
            Schedule::new(
                8,
                &[
                    ("Push A", 0),
                    ("Pull A", 1),
                    ("Legs A", 2),
                    ("Push B", 4),
                    ("Pull B", 5),
                    ("Legs B", 6),
                ],
            ),
        ),
        (
            "full-body",
            Schedule::new(7, &[("Day 1", 0), ("Day 2", 2), ("Day 3", 4)]),
        ),
        ("run", Schedule::new(7, &[("Long Run", 6)])),
    ];

    presets
        .into_iter()
        .map(|(name, schedule)| (name.to_string(), schedule))
        .collect()
}

/// How day offsets within a cycle are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayOffsets {
    /// Every workout type lands on the same day of the cycle.
    Uniform(u32),
    /// Per-workout-type positions.
    Table(Schedule),
}

/// Which known date the other dates are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// First day of week 1 (snapped back to its Monday).
    Forward { start: NaiveDate },
    /// Date of the last workout in the sheet. `total_weeks` of None means
    /// the highest week number found in the header.
    Backward {
        end: NaiveDate,
        total_weeks: Option<u32>,
    },
}

/// Complete date-assignment configuration for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePolicy {
    pub anchor: Anchor,
    pub offsets: DayOffsets,
    /// Days per sheet week when counting backward. Forward dating always
    /// steps one calendar week.
    pub cycle_days: u32,
}

impl DatePolicy {
    /// Returns the date of `day` in `week_number`, or None if the workout type
    /// is not part of the schedule.
    ///
    /// `detected_weeks` is the highest week number seen in the sheet header,
    /// used by backward anchoring when no explicit total is configured.
    pub fn date_for(
        &self,
        week_number: u32,
        day: &WorkoutDay,
        detected_weeks: u32,
    ) -> Option<NaiveDate> {
        match self.anchor {
            Anchor::Forward { start } => {
                let offset = match &self.offsets {
                    DayOffsets::Uniform(offset) => *offset,
                    DayOffsets::Table(schedule) => schedule.position(day)?,
                };
                forward_date(start, week_number, offset)
            }
            Anchor::Backward { end, total_weeks } => {
                let days_before_anchor = match &self.offsets {
                    DayOffsets::Uniform(_) => 0,
                    DayOffsets::Table(schedule) => {
                        i64::from(schedule.anchor_position()?) - i64::from(schedule.position(day)?)
                    }
                };
                let total = total_weeks.unwrap_or(detected_weeks);
                backward_date(end, week_number, total, self.cycle_days, days_before_anchor)
            }
        }
    }
}

/// Returns the Monday of the calendar week containing `date`.
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Date for a week counted forward from the Monday of `start`'s week.
///
/// Returns None when the result is outside the representable date range.
pub fn forward_date(start: NaiveDate, week_number: u32, day_offset: u32) -> Option<NaiveDate> {
    let days = (i64::from(week_number) - 1)
        .checked_mul(DAYS_PER_WEEK)?
        .checked_add(i64::from(day_offset))?;
    week_monday(start).checked_add_signed(Duration::try_days(days)?)
}

/// Date for a week counted backward from the anchor workout on `end`.
///
/// `days_before_anchor` is how many days the workout type sits before the
/// anchor type within one cycle (negative if it comes after).
pub fn backward_date(
    end: NaiveDate,
    week_number: u32,
    total_weeks: u32,
    cycle_days: u32,
    days_before_anchor: i64,
) -> Option<NaiveDate> {
    let weeks_back = i64::from(total_weeks) - i64::from(week_number);
    let days = weeks_back
        .checked_mul(i64::from(cycle_days))?
        .checked_add(days_before_anchor)?;
    end.checked_sub_signed(Duration::try_days(days)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn day(name: &str) -> WorkoutDay {
        WorkoutDay::new(name, name)
    }

    #[test]
    fn test_week_monday() {
        assert_eq!(week_monday(date(2026, 1, 5)), date(2026, 1, 5));
        assert_eq!(week_monday(date(2026, 1, 8)), date(2026, 1, 5));
        assert_eq!(week_monday(date(2026, 1, 11)), date(2026, 1, 5));
    }

    #[test]
    fn test_forward_date_law() {
        let start = date(2026, 1, 5);
        assert_eq!(forward_date(start, 1, 0), Some(date(2026, 1, 5)));
        assert_eq!(forward_date(start, 2, 2), Some(date(2026, 1, 14)));
    }

    #[test]
    fn test_forward_snaps_to_monday() {
        // Thursday start still counts from that week's Monday
        let start = date(2026, 1, 8);
        assert_eq!(forward_date(start, 1, 0), Some(date(2026, 1, 5)));
    }

    #[test]
    fn test_backward_date_law() {
        let end = date(2025, 7, 5);
        assert_eq!(backward_date(end, 10, 10, 8, 0), Some(date(2025, 7, 5)));
        assert_eq!(backward_date(end, 9, 10, 8, 0), Some(date(2025, 6, 27)));
    }

    #[test]
    fn test_backward_policy_anchor_type_maps_to_end_date() {
        let schedules = builtin_schedules();
        let policy = DatePolicy {
            anchor: Anchor::Backward {
                end: date(2025, 7, 5),
                total_weeks: Some(10),
            },
            offsets: DayOffsets::Table(schedules["ppl-ab"].clone()),
            cycle_days: 8,
        };

        let legs_b = WorkoutDay::new("Legs B", "Legs");
        assert_eq!(schedules["ppl-ab"].position(&legs_b), Some(6));
        assert_eq!(policy.date_for(10, &legs_b, 0), Some(date(2025, 7, 5)));
        assert_eq!(policy.date_for(9, &legs_b, 0), Some(date(2025, 6, 27)));

        // Push A sits six days before Legs B
        let push_a = WorkoutDay::new("Push A", "Push");
        assert_eq!(policy.date_for(10, &push_a, 0), Some(date(2025, 6, 29)));
    }

    #[test]
    fn test_backward_autodetects_total_weeks() {
        let policy = DatePolicy {
            anchor: Anchor::Backward {
                end: date(2025, 7, 5),
                total_weeks: None,
            },
            offsets: DayOffsets::Uniform(0),
            cycle_days: 7,
        };

        assert_eq!(policy.date_for(12, &day("Upper"), 12), Some(date(2025, 7, 5)));
        assert_eq!(policy.date_for(1, &day("Upper"), 12), Some(date(2025, 4, 19)));
    }

    #[test]
    fn test_backward_explicit_anchor() {
        let mut schedule = Schedule::new(7, &[("Push", 0), ("Pull", 1), ("Legs", 2)]);
        schedule.anchor = Some("Pull".to_string());
        let policy = DatePolicy {
            anchor: Anchor::Backward {
                end: date(2025, 7, 5),
                total_weeks: Some(4),
            },
            offsets: DayOffsets::Table(schedule),
            cycle_days: 7,
        };

        assert_eq!(policy.date_for(4, &day("Pull"), 4), Some(date(2025, 7, 5)));
        assert_eq!(policy.date_for(4, &day("Push"), 4), Some(date(2025, 7, 4)));
        // Legs comes after the anchor type
        assert_eq!(policy.date_for(4, &day("Legs"), 4), Some(date(2025, 7, 6)));
    }

    #[test]
    fn test_forward_policy_uses_schedule_table() {
        let policy = DatePolicy {
            anchor: Anchor::Forward {
                start: date(2026, 1, 5),
            },
            offsets: DayOffsets::Table(builtin_schedules()["ppl"].clone()),
            cycle_days: 7,
        };

        assert_eq!(policy.date_for(1, &day("Push"), 3), Some(date(2026, 1, 5)));
        assert_eq!(policy.date_for(2, &day("Legs"), 3), Some(date(2026, 1, 14)));
        assert_eq!(policy.date_for(1, &day("Upper"), 3), None);
    }

    #[test]
    fn test_forward_ignores_longer_cycle() {
        let policy = DatePolicy {
            anchor: Anchor::Forward {
                start: date(2026, 1, 5),
            },
            offsets: DayOffsets::Table(builtin_schedules()["ppl-ab"].clone()),
            cycle_days: 8,
        };

        let push_a = WorkoutDay::new("Push A", "Push");
        assert_eq!(policy.date_for(2, &push_a, 4), Some(date(2026, 1, 12)));
        assert_eq!(policy.date_for(4, &push_a, 4), Some(date(2026, 1, 26)));
    }

    #[test]
    fn test_huge_offsets_yield_none() {
        let start = date(2026, 1, 5);
        assert_eq!(forward_date(start, u32::MAX, u32::MAX), None);
        assert_eq!(backward_date(start, 0, u32::MAX, u32::MAX, 0), None);
        assert_eq!(backward_date(start, 0, 4_000_000_000, 100_000, 0), None);
    }

    #[test]
    fn test_sparse_week_numbers_use_literal_value() {
        let policy = DatePolicy {
            anchor: Anchor::Forward {
                start: date(2026, 1, 5),
            },
            offsets: DayOffsets::Uniform(0),
            cycle_days: 7,
        };

        assert_eq!(policy.date_for(5, &day("Push"), 5), Some(date(2026, 2, 2)));
    }

    #[test]
    fn test_schedule_position_falls_back_to_label() {
        let schedule = Schedule::new(7, &[("Pull", 1)]);
        assert_eq!(schedule.position(&WorkoutDay::new("Pull A", "Pull")), Some(1));
        assert_eq!(schedule.position(&WorkoutDay::new("Day 2", "Day 2")), None);
    }
}
