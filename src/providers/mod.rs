pub mod fitbit;
pub mod habitica;
pub mod todoist;
pub mod upstream;

mod bootstrap;

pub use bootstrap::Providers;

use async_trait::async_trait;
use pulsedash_schema::{Daily, Habit, TodoistStats, TodoistTask};

use crate::error::DashError;

/// Outbound scoring action on the habit tracker.
#[async_trait]
pub trait HabitScorer: Send + Sync {
    async fn score_up(&self, task_id: &str) -> Result<(), DashError>;
}

/// Read side of the habit tracker used by the widget.
#[async_trait]
pub trait HabitReader: Send + Sync {
    async fn habits(&self) -> Result<Vec<Habit>, DashError>;
    async fn dailies(&self) -> Result<Vec<Daily>, DashError>;
}

/// Read side of the task manager used by the widget.
#[async_trait]
pub trait TaskReader: Send + Sync {
    async fn filter_tasks(&self, query: &str, limit: u32) -> Result<Vec<TodoistTask>, DashError>;
    async fn completed_stats(&self) -> Result<TodoistStats, DashError>;
}
