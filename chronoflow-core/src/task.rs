//! Task model for the weekly scheduler.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work waiting to be placed somewhere in the week.
///
/// Tasks are owned by the [`TaskStore`](crate::TaskStore); schedule entries only
/// carry the task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,

    /// Minutes, always positive.
    pub duration: u32,

    /// Cost taken out of a day's energy budget.
    pub energy: u32,

    /// Batch tag: tasks sharing a group never land on the same day.
    #[serde(default)]
    pub group_id: Option<String>,

    /// True iff some day currently holds an entry for this task.
    #[serde(default)]
    pub scheduled: bool,
}

impl Task {
    /// New unscheduled task with a fresh id.
    pub fn new(title: impl Into<String>, duration: u32, energy: u32) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            duration,
            energy,
            group_id: None,
            scheduled: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Difficulty heuristic used to order auto-assignment: hardest to fit first.
    pub fn difficulty(&self) -> u64 {
        u64::from(self.energy) * u64::from(self.duration)
    }

    pub fn shares_group_with(&self, other: &Task) -> bool {
        matches!((&self.group_id, &other.group_id), (Some(a), Some(b)) if a == b)
    }
}

/// Opaque identifier for tasks and task batches.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_starts_unscheduled_with_unique_id() {
        let a = Task::new("Read", 45, 8);
        let b = Task::new("Read", 45, 8);
        assert!(!a.scheduled);
        assert_ne!(a.id, b.id);
        assert!(a.group_id.is_none());
    }

    #[test]
    fn difficulty_is_energy_times_duration() {
        let t = Task::new("Gym", 90, 15);
        assert_eq!(t.difficulty(), 1350);
    }

    #[test]
    fn group_sharing_requires_both_tags() {
        let a = Task::new("a", 30, 5).with_group("g1");
        let b = Task::new("b", 30, 5).with_group("g1");
        let c = Task::new("c", 30, 5);
        assert!(a.shares_group_with(&b));
        assert!(!a.shares_group_with(&c));
        assert!(!c.shares_group_with(&c.clone()));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let t = Task::new("Call mom", 30, 5).with_id("t1").with_group("batch");
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["groupId"], "batch");
        assert_eq!(json["scheduled"], false);
    }
}
