//! chronoflow-core: weekly energy-aware task scheduling engine.

pub mod assign;
pub mod clock;
pub mod config;
pub mod day;
pub mod persistence;
pub mod predict;
pub mod scheduler;
pub mod slots;
pub mod task;
pub mod task_store;

pub use assign::{AssignReport, Placement};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Holiday, ScheduleConfig, STORAGE_KEY};
pub use day::{build_week, format_minutes, week_start_of, BlockedRange, Day, ScheduleEntry};
pub use persistence::{FileStore, MemoryStore, NoStore, Snapshot, StateStore};
pub use predict::{predict, Prediction};
pub use scheduler::{ScheduleStats, Scheduler};
pub use slots::SlotGrid;
pub use task::Task;
pub use task_store::TaskStore;
