//! Slot finder: first free window on a day, scanned at a fixed step.
//!
//! The scan only visits `day_start, day_start + step, ...`, so a gap that
//! opens between two steps can be missed. Callers depend on that exact grid.

use crate::config::ScheduleConfig;
use crate::day::Day;

/// Search bounds and granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotGrid {
    pub day_start: u32,
    pub day_end: u32,
    pub step: u32,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            day_start: 360,
            day_end: 1380,
            step: 15,
        }
    }
}

impl From<&ScheduleConfig> for SlotGrid {
    fn from(cfg: &ScheduleConfig) -> Self {
        Self {
            day_start: cfg.day_start,
            day_end: cfg.day_end,
            step: cfg.slot_step.max(1),
        }
    }
}

impl SlotGrid {
    /// Earliest grid start whose `[start, start + duration)` is free on `day`.
    pub fn find_free_window(&self, day: &Day, duration: u32) -> Option<u32> {
        let last_start = self.day_end.checked_sub(duration)?;
        if last_start < self.day_start {
            return None;
        }
        (self.day_start..=last_start)
            .step_by(self.step as usize)
            .find(|&start| is_time_free(day, start, start + duration))
    }
}

/// No blocked range and no existing entry intersects `[start, end)`.
pub fn is_time_free(day: &Day, start: u32, end: u32) -> bool {
    !day.blocked_ranges.iter().any(|b| b.overlaps(start, end))
        && !day.scheduled_items.iter().any(|e| e.overlaps(start, end))
}
