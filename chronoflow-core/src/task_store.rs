//! TaskStore: ordered, id-addressed collection of every known task.
//!
//! Insertion order is preserved; it is the tie-breaker when auto-assignment
//! sorts tasks of equal difficulty.

use crate::task::Task;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Remove by id. Unknown ids are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(pos))
    }

    pub fn unscheduled(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.scheduled)
    }

    pub(crate) fn set_scheduled(&mut self, id: &str, scheduled: bool) {
        if let Some(t) = self.get_mut(id) {
            t.scheduled = scheduled;
        }
    }

    pub(crate) fn unschedule_all(&mut self) {
        for t in self.tasks.iter_mut() {
            t.scheduled = false;
        }
    }

    /// Sum of energy for the given task ids; ids not in the store count as 0.
    pub fn energy_of<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> u32 {
        ids.into_iter()
            .filter_map(|id| self.get(id))
            .fold(0u32, |acc, t| acc.saturating_add(t.energy))
    }
}
