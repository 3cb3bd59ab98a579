//! Persistence: key/value storage backends and the JSON snapshot format.
//!
//! Snapshot layout (one key):
//!
//! ```json
//! { "tasks": [Task...], "days": [{ "dateLabel": "Nov 24", ..., "scheduledItems": [{ "task": Task, "start": 1140, "end": 1200 }] }] }
//! ```
//!
//! The task embedded in each saved entry is a stale copy. On restore, entries
//! are relinked to the restored task list by id and the copy is ignored.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::day::{BlockedRange, Day, ScheduleEntry};
use crate::slots::is_time_free;
use crate::task::Task;
use crate::task_store::TaskStore;

/// Durable string storage addressed by key.
pub trait StateStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// False when there is nowhere to persist to; the scheduler then skips
    /// save/load entirely.
    fn is_available(&self) -> bool {
        true
    }
}

/// In-process map. Survives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl StateStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let p = self.path_for(key);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        Ok(Some(s))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create {}", self.dir.display()))?;
        let p = self.path_for(key);
        fs::write(&p, value).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }
}

/// Storage is unavailable: nothing is read, writes are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl StateStore for NoStore {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub days: Vec<SavedDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SavedDay {
    pub name: String,
    pub date: Option<NaiveDate>,
    pub date_label: String,
    pub is_weekend: bool,
    pub is_passed: bool,
    pub energy_capacity: u32,
    pub current_energy_load: u32,
    pub blocked_ranges: Vec<BlockedRange>,
    pub theme: Option<String>,
    pub scheduled_items: Vec<SavedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub task: Task,
    pub start: u32,
    pub end: u32,
}

impl Snapshot {
    pub fn capture(tasks: &TaskStore, days: &[Day]) -> Self {
        Self {
            tasks: tasks.as_slice().to_vec(),
            days: days.iter().map(|d| SavedDay::capture(d, tasks)).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("serialize snapshot")
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parse snapshot")
    }

    /// Restore the task list and relink saved entries onto `fresh_days`.
    ///
    /// `fresh_days` must come straight from the day builder so date-derived
    /// fields reflect today, not the save time. Saved days are matched by
    /// date, or by date label for snapshots written without one. Entries are
    /// dropped when their task id is gone, or when they no longer fit the
    /// fresh day (blocked time, another entry, energy capacity); the task
    /// then goes back to the unscheduled pool.
    pub fn restore(self, fresh_days: &mut [Day]) -> TaskStore {
        let mut tasks = TaskStore::from_tasks(self.tasks);
        // `scheduled` is re-derived from the entries that actually relink.
        tasks.unschedule_all();

        let mut orphaned = 0usize;
        let mut conflicting = 0usize;
        for saved in self.days {
            let Some(day) = fresh_days.iter_mut().find(|d| saved.matches(d)) else {
                orphaned += saved.scheduled_items.len();
                continue;
            };

            for item in saved.scheduled_items {
                let Some(real) = tasks.get(&item.task.id) else {
                    orphaned += 1;
                    continue;
                };
                if real.scheduled {
                    orphaned += 1;
                    continue;
                }
                let energy = real.energy;
                if item.end <= item.start
                    || !day.can_afford(energy)
                    || !is_time_free(day, item.start, item.end)
                {
                    conflicting += 1;
                    continue;
                }
                day.insert_entry(
                    ScheduleEntry {
                        task_id: item.task.id.clone(),
                        start: item.start,
                        end: item.end,
                    },
                    energy,
                );
                tasks.set_scheduled(&item.task.id, true);
            }
            day.sort_items();
        }

        if orphaned > 0 {
            debug!(orphaned, "dropped saved entries that no longer link to a task or day");
        }
        if conflicting > 0 {
            warn!(conflicting, "saved entries no longer fit their day; tasks returned to the pool");
        }
        tasks
    }
}

impl SavedDay {
    fn matches(&self, day: &Day) -> bool {
        match self.date {
            Some(date) => date == day.date,
            None => self.date_label == day.date_label,
        }
    }

    fn capture(day: &Day, tasks: &TaskStore) -> Self {
        Self {
            name: day.name.clone(),
            date: Some(day.date),
            date_label: day.date_label.clone(),
            is_weekend: day.is_weekend,
            is_passed: day.is_passed,
            energy_capacity: day.energy_capacity,
            current_energy_load: day.current_energy_load,
            blocked_ranges: day.blocked_ranges.clone(),
            theme: day.theme.clone(),
            scheduled_items: day
                .scheduled_items
                .iter()
                .filter_map(|e| {
                    tasks.get(&e.task_id).map(|t| SavedEntry {
                        task: t.clone(),
                        start: e.start,
                        end: e.end,
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::day::build_week;

    fn fresh_week() -> Vec<Day> {
        build_week(
            &ScheduleConfig::default(),
            NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
        )
    }

    fn saved_entry(task: Task, start: u32) -> SavedEntry {
        let end = start + task.duration;
        SavedEntry { task, start, end }
    }

    #[test]
    fn restore_links_by_id_not_by_embedded_copy() {
        let real = Task::new("Read (edited)", 60, 12).with_id("t1");
        let stale = Task::new("Read", 60, 20).with_id("t1");

        let snapshot = Snapshot {
            tasks: vec![real],
            days: vec![SavedDay {
                date_label: "Nov 24".into(),
                scheduled_items: vec![saved_entry(stale, 1140)],
                ..SavedDay::default()
            }],
        };

        let mut days = fresh_week();
        let tasks = snapshot.restore(&mut days);

        assert!(tasks.get("t1").unwrap().scheduled);
        assert_eq!(days[0].current_energy_load, 12);
        assert_eq!(days[0].scheduled_items[0].task_id, "t1");
    }

    #[test]
    fn restore_drops_orphans_and_sorts() {
        let a = Task::new("a", 30, 5).with_id("a");
        let b = Task::new("b", 30, 5).with_id("b");
        let ghost = Task::new("ghost", 30, 5).with_id("ghost");

        let snapshot = Snapshot {
            tasks: vec![a.clone(), b.clone()],
            days: vec![
                SavedDay {
                    date_label: "Nov 25".into(),
                    scheduled_items: vec![
                        saved_entry(b, 1200),
                        saved_entry(ghost, 1140),
                        saved_entry(a, 1170),
                    ],
                    ..SavedDay::default()
                },
                SavedDay {
                    date_label: "Dec 25".into(),
                    scheduled_items: vec![],
                    ..SavedDay::default()
                },
            ],
        };

        let mut days = fresh_week();
        let tasks = snapshot.restore(&mut days);

        let ids: Vec<_> = days[1].scheduled_items.iter().map(|e| e.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(days[1].current_energy_load, 10);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn restore_resets_flags_of_unlinked_tasks() {
        let mut t = Task::new("stale flag", 30, 5).with_id("t");
        t.scheduled = true;
        let snapshot = Snapshot {
            tasks: vec![t],
            days: vec![],
        };

        let tasks = snapshot.restore(&mut fresh_week());
        assert!(!tasks.get("t").unwrap().scheduled);
    }

    #[test]
    fn restore_keeps_one_entry_per_task() {
        let t = Task::new("dup", 30, 5).with_id("t");
        let snapshot = Snapshot {
            tasks: vec![t.clone()],
            days: vec![
                SavedDay {
                    date_label: "Nov 24".into(),
                    scheduled_items: vec![saved_entry(t.clone(), 1140)],
                    ..SavedDay::default()
                },
                SavedDay {
                    date_label: "Nov 25".into(),
                    scheduled_items: vec![saved_entry(t, 1140)],
                    ..SavedDay::default()
                },
            ],
        };

        let mut days = fresh_week();
        snapshot.restore(&mut days);
        assert_eq!(days[0].scheduled_items.len(), 1);
        assert!(days[1].scheduled_items.is_empty());
    }

    fn week_of(anchor: NaiveDate, today: NaiveDate) -> Vec<Day> {
        build_week(&ScheduleConfig::default().with_anchor(anchor), today)
    }

    fn saturday_noon_snapshot(date: Option<NaiveDate>) -> Snapshot {
        let t = Task::new("Hike", 60, 20).with_id("hike");
        Snapshot {
            tasks: vec![t.clone()],
            days: vec![SavedDay {
                date,
                date_label: "Nov 29".into(),
                scheduled_items: vec![saved_entry(t, 720)],
                ..SavedDay::default()
            }],
        }
    }

    #[test]
    fn restore_matches_by_date_before_label() {
        let sat_2025 = NaiveDate::from_ymd_opt(2025, 11, 29).unwrap();
        // Nov 29 2027 is a Monday: same label, different date.
        let week_2027 = NaiveDate::from_ymd_opt(2027, 11, 29).unwrap();
        let today = NaiveDate::from_ymd_opt(2027, 11, 1).unwrap();

        let mut days = week_of(week_2027, today);
        assert_eq!(days[0].date_label, "Nov 29");
        let tasks = saturday_noon_snapshot(Some(sat_2025)).restore(&mut days);

        assert!(days.iter().all(|d| d.scheduled_items.is_empty()));
        assert!(!tasks.get("hike").unwrap().scheduled);

        // The same day, still in its original week, relinks.
        let mut days = week_of(crate::config::reference_week_start(), today);
        let tasks = saturday_noon_snapshot(Some(sat_2025)).restore(&mut days);
        assert!(days[5].holds_task("hike"));
        assert!(tasks.get("hike").unwrap().scheduled);
    }

    #[test]
    fn restore_by_label_drops_entries_in_blocked_time() {
        let week_2027 = NaiveDate::from_ymd_opt(2027, 11, 29).unwrap();
        let mut days = week_of(week_2027, NaiveDate::from_ymd_opt(2027, 11, 1).unwrap());

        // Undated snapshot: label matches Monday, where 12:00 is work time.
        let tasks = saturday_noon_snapshot(None).restore(&mut days);

        assert!(days[0].scheduled_items.is_empty());
        assert_eq!(days[0].current_energy_load, 0);
        assert!(!tasks.get("hike").unwrap().scheduled);
    }

    #[test]
    fn restore_drops_overlaps_and_entries_over_capacity() {
        let a = Task::new("a", 30, 20).with_id("a");
        let b = Task::new("b", 30, 5).with_id("b");
        let c = Task::new("c", 30, 20).with_id("c");
        let snapshot = Snapshot {
            tasks: vec![a.clone(), b.clone(), c.clone()],
            days: vec![SavedDay {
                date_label: "Nov 24".into(),
                scheduled_items: vec![
                    saved_entry(a, 1140),
                    // overlaps a
                    saved_entry(b, 1155),
                    // 20 + 20 > 30
                    saved_entry(c, 1200),
                ],
                ..SavedDay::default()
            }],
        };

        let mut days = fresh_week();
        let tasks = snapshot.restore(&mut days);

        let ids: Vec<_> = days[0].scheduled_items.iter().map(|e| e.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(days[0].current_energy_load, 20);
        assert!(!tasks.get("b").unwrap().scheduled);
        assert!(!tasks.get("c").unwrap().scheduled);
    }

    #[test]
    fn snapshot_json_embeds_task_copies() {
        let mut tasks = TaskStore::new();
        tasks.push(Task::new("Call", 30, 5).with_id("c"));
        let mut days = fresh_week();
        days[0].insert_entry(
            ScheduleEntry {
                task_id: "c".into(),
                start: 1140,
                end: 1170,
            },
            5,
        );

        let json = Snapshot::capture(&tasks, &days).to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["days"][0]["dateLabel"], "Nov 24");
        assert_eq!(v["days"][0]["scheduledItems"][0]["task"]["title"], "Call");
        assert_eq!(v["days"][0]["scheduledItems"][0]["start"], 1140);
        assert_eq!(v["tasks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parse_tolerates_missing_sections() {
        let s = Snapshot::from_json("{}").unwrap();
        assert!(s.tasks.is_empty() && s.days.is_empty());
        assert!(Snapshot::from_json("not json").is_err());
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.read("k").unwrap(), None);
        store.write("k", "{\"tasks\":[]}").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("{\"tasks\":[]}"));
        assert!(store.path_for("k").ends_with("k.json"));
    }

    #[test]
    fn no_store_is_unavailable() {
        let mut store = NoStore;
        store.write("k", "v").unwrap();
        assert_eq!(store.read("k").unwrap(), None);
        assert!(!store.is_available());
    }
}
