//! Scheduler: owns the task store and the week, and is the only entry point
//! that mutates them.
//!
//! Every mutating operation snapshots the full state to the injected
//! [`StateStore`]. Storage failures are logged and never surface to callers;
//! the in-memory model keeps working without durability.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, warn};

use crate::assign::{self, AssignReport};
use crate::clock::Clock;
use crate::config::ScheduleConfig;
use crate::day::{build_week, Day, ScheduleEntry};
use crate::persistence::{Snapshot, StateStore};
use crate::slots::SlotGrid;
use crate::task::{new_id, Task};
use crate::task_store::TaskStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStats {
    pub total_energy_used: u32,
    pub total_energy_capacity: u32,
    pub scheduled_tasks: usize,
    pub unscheduled_tasks: usize,
}

#[derive(Debug)]
pub struct Scheduler<S: StateStore, C: Clock> {
    config: ScheduleConfig,
    grid: SlotGrid,
    store: S,
    clock: C,
    tasks: TaskStore,
    days: Vec<Day>,
}

impl<S: StateStore, C: Clock> Scheduler<S, C> {
    /// Default configuration; restores saved state from `store` if present.
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(ScheduleConfig::default(), store, clock)
    }

    pub fn with_config(config: ScheduleConfig, store: S, clock: C) -> Self {
        let days = build_week(&config, clock.today());
        let mut scheduler = Self {
            grid: SlotGrid::from(&config),
            config,
            store,
            clock,
            tasks: TaskStore::new(),
            days,
        };
        scheduler.load();
        scheduler
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.as_slice()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the storage backend back, e.g. to reload it in a new scheduler.
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn unscheduled_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.unscheduled()
    }

    /// Every placed entry with its day and task, Monday first, by start time.
    pub fn placements(&self) -> impl Iterator<Item = (&Day, &ScheduleEntry, &Task)> {
        self.days.iter().flat_map(move |day| {
            day.scheduled_items
                .iter()
                .filter_map(move |e| self.tasks.get(&e.task_id).map(|t| (day, e, t)))
        })
    }

    /// Add one task. Blank titles and zero durations are rejected with `None`.
    pub fn add_task(
        &mut self,
        title: &str,
        duration: u32,
        energy: u32,
        group_id: Option<&str>,
    ) -> Option<Task> {
        let task = self.push_task(title, duration, energy, group_id)?;
        self.save();
        Some(task)
    }

    /// Add `frequency` copies of a task sharing a fresh group id, so
    /// auto-assignment spreads them over different days.
    pub fn add_task_batch(
        &mut self,
        title: &str,
        duration: u32,
        energy: u32,
        frequency: usize,
    ) -> Vec<Task> {
        let group = new_id();
        let added: Vec<Task> = (0..frequency)
            .map_while(|_| self.push_task(title, duration, energy, Some(&group)))
            .collect();
        if !added.is_empty() {
            self.save();
        }
        added
    }

    fn push_task(
        &mut self,
        title: &str,
        duration: u32,
        energy: u32,
        group_id: Option<&str>,
    ) -> Option<Task> {
        let title = title.trim();
        if title.is_empty() || duration == 0 {
            debug!(title, duration, "rejected task");
            return None;
        }
        let mut task = Task::new(title, duration, energy);
        task.group_id = group_id.map(str::to_string);
        self.tasks.push(task.clone());
        Some(task)
    }

    /// Remove a task and any entry that references it. Unknown ids are a no-op.
    pub fn delete_task(&mut self, task_id: &str) -> Option<Task> {
        let removed = self.tasks.remove(task_id)?;
        for day in self.days.iter_mut() {
            day.remove_task(task_id, &self.tasks);
        }
        self.save();
        Some(removed)
    }

    /// Rebuild the week from scratch against today's date and unschedule
    /// every task. The task list itself is untouched.
    pub fn clear_schedule(&mut self) {
        self.days = build_week(&self.config, self.clock.today());
        self.tasks.unschedule_all();
        self.save();
    }

    /// Greedily place every unscheduled task. Tasks that fit nowhere stay in
    /// the pool and are listed in the report.
    pub fn auto_assign(&mut self) -> AssignReport {
        let report = assign::auto_assign(&mut self.days, &mut self.tasks, &self.grid);
        self.save();
        report
    }

    pub fn stats(&self) -> ScheduleStats {
        let scheduled_tasks = self.tasks.iter().filter(|t| t.scheduled).count();
        ScheduleStats {
            total_energy_used: self.days.iter().map(|d| d.current_energy_load).sum(),
            total_energy_capacity: self.days.iter().map(|d| d.energy_capacity).sum(),
            scheduled_tasks,
            unscheduled_tasks: self.tasks.len() - scheduled_tasks,
        }
    }

    /// Persist the full state; failures are logged.
    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            warn!(error = %e, "failed to save schedule; continuing in memory");
        }
    }

    pub fn try_save(&mut self) -> Result<()> {
        if !self.store.is_available() {
            return Ok(());
        }
        let json = Snapshot::capture(&self.tasks, &self.days).to_json()?;
        self.store.write(&self.config.storage_key, &json)
    }

    /// Restore saved state if any. Returns whether something was restored;
    /// unreadable state is logged and ignored.
    pub fn load(&mut self) -> bool {
        match self.try_load() {
            Ok(restored) => restored,
            Err(e) => {
                warn!(error = %e, "failed to load saved schedule; starting empty");
                false
            }
        }
    }

    pub fn try_load(&mut self) -> Result<bool> {
        if !self.store.is_available() {
            return Ok(false);
        }
        let Some(raw) = self.store.read(&self.config.storage_key)? else {
            return Ok(false);
        };
        let snapshot = Snapshot::from_json(&raw)?;

        let mut days = build_week(&self.config, self.clock.today());
        self.tasks = snapshot.restore(&mut days);
        self.days = days;
        debug!(tasks = self.tasks.len(), "restored saved schedule");
        Ok(true)
    }
}
