//! Schedule configuration: capacities, blocked-time templates, holidays and
//! slot-search bounds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::day::BlockedRange;

/// Key the full state snapshot is stored under.
pub const STORAGE_KEY: &str = "chronoFlowData";

/// Monday of the reference week (Thanksgiving week 2025).
pub fn reference_week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 24).unwrap_or_default()
}

/// A recurring calendar date (month/day, any year) on which nothing may be
/// scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub label: String,
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First day (Monday) of the scheduled week.
    pub anchor: NaiveDate,

    pub weekday_capacity: u32,
    pub weekend_capacity: u32,

    /// Slot search bounds, minutes from midnight.
    pub day_start: u32,
    pub day_end: u32,
    /// Granularity of the slot search, minutes.
    pub slot_step: u32,

    pub storage_key: String,

    pub weekday_blocks: Vec<BlockedRange>,
    pub weekend_blocks: Vec<BlockedRange>,
    pub holidays: Vec<Holiday>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            anchor: reference_week_start(),
            weekday_capacity: 30,
            weekend_capacity: 100,
            day_start: 360,
            day_end: 1380,
            slot_step: 15,
            storage_key: STORAGE_KEY.to_string(),
            weekday_blocks: vec![
                BlockedRange::new(0, 480, "Sleep / Morning Routine"),
                BlockedRange::new(480, 1140, "Work + Commute"),
                BlockedRange::new(1260, 1440, "Wind Down"),
            ],
            weekend_blocks: vec![BlockedRange::new(0, 720, "Weekend Morning")],
            holidays: vec![Holiday {
                month: 11,
                day: 27,
                label: "Thanksgiving Holiday".to_string(),
                theme: Some("thanksgiving".to_string()),
            }],
        }
    }
}

impl ScheduleConfig {
    pub fn with_anchor(mut self, anchor: NaiveDate) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn holiday_on(&self, month: u32, day: u32) -> Option<&Holiday> {
        self.holidays
            .iter()
            .find(|h| h.month == month && h.day == day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Weekday};

    #[test]
    fn reference_week_starts_on_monday() {
        assert_eq!(reference_week_start().weekday(), Weekday::Mon);
    }

    #[test]
    fn default_templates_are_disjoint() {
        let cfg = ScheduleConfig::default();
        for blocks in [&cfg.weekday_blocks, &cfg.weekend_blocks] {
            for (i, a) in blocks.iter().enumerate() {
                for b in blocks.iter().skip(i + 1) {
                    assert!(!a.overlaps(b.start, b.end), "{a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: ScheduleConfig = serde_json::from_str(r#"{"weekday_capacity": 50}"#).unwrap();
        assert_eq!(cfg.weekday_capacity, 50);
        assert_eq!(cfg.weekend_capacity, 100);
        assert_eq!(cfg.slot_step, 15);
    }

    #[test]
    fn thanksgiving_is_a_default_holiday() {
        let cfg = ScheduleConfig::default();
        let h = cfg.holiday_on(11, 27).unwrap();
        assert_eq!(h.theme.as_deref(), Some("thanksgiving"));
        assert!(cfg.holiday_on(11, 28).is_none());
    }
}
