//! Day model: the seven calendar days of the scheduled week, their energy
//! budgets, blocked time and placed entries.
//!
//! All times are minutes from local midnight (0 = 00:00, 1440 = end of day).
//! Intervals are half-open: `[start, end)`.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ScheduleConfig;
use crate::task::Task;
use crate::task_store::TaskStore;

pub const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MINUTES_PER_DAY: u32 = 1440;

/// Unavailable time inside a day (sleep, work, holiday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedRange {
    pub start: u32,
    pub end: u32,
    #[serde(default)]
    pub label: String,
}

impl BlockedRange {
    pub fn new(start: u32, end: u32, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end && end > self.start
    }
}

/// Placement of one task on one day. Holds the task id, never a copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub task_id: String,
    pub start: u32,
    pub end: u32,
}

impl ScheduleEntry {
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end && end > self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub name: String,
    pub date: NaiveDate,
    /// Short label such as "Nov 24"; used to match saved days on reload.
    pub date_label: String,
    pub is_weekend: bool,
    pub is_passed: bool,
    pub energy_capacity: u32,
    /// Always the sum of energy over `scheduled_items`.
    pub current_energy_load: u32,
    pub blocked_ranges: Vec<BlockedRange>,
    pub theme: Option<String>,
    /// Sorted by start time.
    pub scheduled_items: Vec<ScheduleEntry>,
}

impl Day {
    pub fn can_afford(&self, energy: u32) -> bool {
        self.current_energy_load
            .checked_add(energy)
            .is_some_and(|load| load <= self.energy_capacity)
    }

    pub fn holds_task(&self, task_id: &str) -> bool {
        self.scheduled_items.iter().any(|e| e.task_id == task_id)
    }

    /// Whether any entry on this day is in the same group as `task`.
    pub fn has_group_of(&self, task: &Task, tasks: &TaskStore) -> bool {
        self.scheduled_items.iter().any(|e| {
            tasks
                .get(&e.task_id)
                .is_some_and(|placed| placed.shares_group_with(task))
        })
    }

    pub(crate) fn insert_entry(&mut self, entry: ScheduleEntry, energy: u32) {
        self.scheduled_items.push(entry);
        self.current_energy_load = self.current_energy_load.saturating_add(energy);
        self.sort_items();
    }

    /// Drop every entry for `task_id`; returns how many were removed.
    pub(crate) fn remove_task(&mut self, task_id: &str, tasks: &TaskStore) -> usize {
        let before = self.scheduled_items.len();
        self.scheduled_items.retain(|e| e.task_id != task_id);
        self.recompute_load(tasks);
        before - self.scheduled_items.len()
    }

    pub(crate) fn recompute_load(&mut self, tasks: &TaskStore) {
        self.current_energy_load =
            tasks.energy_of(self.scheduled_items.iter().map(|e| e.task_id.as_str()));
    }

    pub(crate) fn sort_items(&mut self) {
        // Stable: entries with equal starts keep insertion order.
        self.scheduled_items.sort_by_key(|e| e.start);
    }
}

/// Build the seven days of the configured week, Monday first.
///
/// `today` decides `is_passed`; only calendar dates are compared.
pub fn build_week(config: &ScheduleConfig, today: NaiveDate) -> Vec<Day> {
    DAY_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| build_day(config, index, name, today))
        .collect()
}

fn build_day(config: &ScheduleConfig, index: usize, name: &str, today: NaiveDate) -> Day {
    let date = config
        .anchor
        .checked_add_days(Days::new(index as u64))
        .unwrap_or(config.anchor);
    let is_weekend = index >= 5;

    let (energy_capacity, blocked_ranges, theme) =
        match config.holiday_on(date.month(), date.day()) {
            Some(holiday) => (
                0,
                vec![BlockedRange::new(0, MINUTES_PER_DAY, holiday.label.clone())],
                holiday.theme.clone(),
            ),
            None if is_weekend => (config.weekend_capacity, config.weekend_blocks.clone(), None),
            None => (config.weekday_capacity, config.weekday_blocks.clone(), None),
        };

    Day {
        name: name.to_string(),
        date,
        date_label: date_label(date),
        is_weekend,
        is_passed: date < today,
        energy_capacity,
        current_energy_load: 0,
        blocked_ranges,
        theme,
        scheduled_items: Vec::new(),
    }
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Monday of the week containing `date`.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// "HH:MM" for a minute offset.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
