mod tasks;
mod webhook;

pub use tasks::{Daily, Habit, HabiticaEnvelope, Repeat, TaskCommon};
pub use webhook::{HABIT_TASK_TYPE, HabiticaWebhook, HabiticaWebhookTask};
