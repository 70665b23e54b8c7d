//! Cross-service rules: inbound habit/task events become habit tracker scores.

mod habit;
mod task;

pub use habit::HabitSyncEngine;
pub use task::{TaskOutcome, TaskSyncEngine};
