mod stats;
mod tasks;
mod webhook;

pub use stats::{DayItem, TodoistGoals, TodoistStats, WeekItem};
pub use tasks::{Due, TaskDuration, TodoistTask, TodoistTaskPage};
pub use webhook::{ITEM_COMPLETED_EVENT, TodoistEvent, TodoistWebhook};
