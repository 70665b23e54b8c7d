use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Score `daily_id` once the habit's up-counter reaches exactly `min_score`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct HabitRule {
    pub name: String,
    pub habit_id: String,
    pub daily_id: String,
    pub min_score: i64,
}

/// Completed tasks whose lowercased content starts with `rule_text` score `habit_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct TextRule {
    pub name: String,
    pub rule_text: String,
    pub habit_id: String,
}

impl TextRule {
    pub fn matches(&self, task_text: &str) -> bool {
        task_text.to_lowercase().starts_with(&self.rule_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct ProjectRule {
    pub name: String,
    pub project_id: String,
    pub habit_id: String,
}

/// Connection pool snapshot reported by the health route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbHealth {
    pub up: bool,
    pub open_connections: u32,
    pub idle_connections: usize,
}
