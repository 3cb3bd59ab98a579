//! Auto-assignment: greedy first-fit placement of unscheduled tasks.
//!
//! Order:
//! - difficulty (energy * duration) DESC
//! - store order on ties (stable sort)
//!
//! Each task takes the first day (Mon..Sun) that is not passed, can afford its
//! energy, holds no task from the same group, and has a free window. Placed
//! tasks are never revisited.

use tracing::{debug, info, warn};

use crate::day::{Day, ScheduleEntry};
use crate::slots::SlotGrid;
use crate::task::Task;
use crate::task_store::TaskStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub task_id: String,
    pub day_index: usize,
    pub start: u32,
    pub end: u32,
}

/// Outcome of one auto-assign pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignReport {
    pub placed: Vec<Placement>,
    /// Ids of tasks left in the unscheduled pool.
    pub unplaced: Vec<String>,
}

impl AssignReport {
    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "auto-assign: placed={} unplaced={}",
            self.placed.len(),
            self.unplaced.len()
        )
    }
}

/// Why a day was rejected for a task. Only used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Passed,
    Energy,
    Group,
    NoWindow,
}

pub fn auto_assign(days: &mut [Day], tasks: &mut TaskStore, grid: &SlotGrid) -> AssignReport {
    let mut queue: Vec<Task> = tasks.unscheduled().cloned().collect();
    queue.sort_by(|a, b| b.difficulty().cmp(&a.difficulty()));

    let mut report = AssignReport::default();
    for task in &queue {
        match find_slot_for_task(days, tasks, grid, task) {
            Some((day_index, start)) => {
                let end = start.saturating_add(task.duration);
                if place(days, tasks, day_index, &task.id, start) {
                    debug!(
                        task = %task.title,
                        day = %days[day_index].name,
                        start,
                        end,
                        "placed task"
                    );
                    report.placed.push(Placement {
                        task_id: task.id.clone(),
                        day_index,
                        start,
                        end,
                    });
                } else {
                    report.unplaced.push(task.id.clone());
                }
            }
            None => {
                warn!(task = %task.title, "could not schedule task");
                report.unplaced.push(task.id.clone());
            }
        }
    }

    info!("{}", report.summary());
    report
}

/// First (day index, start) that satisfies every constraint for `task`.
pub fn find_slot_for_task(
    days: &[Day],
    tasks: &TaskStore,
    grid: &SlotGrid,
    task: &Task,
) -> Option<(usize, u32)> {
    days.iter().enumerate().find_map(|(i, day)| {
        match check_day(day, tasks, grid, task) {
            Ok(start) => Some((i, start)),
            Err(reason) => {
                debug!(task = %task.title, day = %day.name, ?reason, "day rejected");
                None
            }
        }
    })
}

fn check_day(day: &Day, tasks: &TaskStore, grid: &SlotGrid, task: &Task) -> Result<u32, Skip> {
    if day.is_passed {
        return Err(Skip::Passed);
    }
    if !day.can_afford(task.energy) {
        return Err(Skip::Energy);
    }
    if day.has_group_of(task, tasks) {
        return Err(Skip::Group);
    }
    grid.find_free_window(day, task.duration).ok_or(Skip::NoWindow)
}

/// Put `task_id` on `days[day_index]` at `start`.
///
/// Refuses (returns false) when the task is unknown, already scheduled, or the
/// day index is out of range; a task never holds two entries.
pub fn place(
    days: &mut [Day],
    tasks: &mut TaskStore,
    day_index: usize,
    task_id: &str,
    start: u32,
) -> bool {
    let Some(task) = tasks.get(task_id) else {
        return false;
    };
    if task.scheduled {
        return false;
    }
    let Some(day) = days.get_mut(day_index) else {
        return false;
    };

    let (energy, end) = (task.energy, start.saturating_add(task.duration));
    day.insert_entry(
        ScheduleEntry {
            task_id: task_id.to_string(),
            start,
            end,
        },
        energy,
    );
    tasks.set_scheduled(task_id, true);
    true
}
