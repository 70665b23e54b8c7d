use serde::{Deserialize, Serialize};

/// Productivity statistics from `GET /tasks/completed/stats`.
///
/// `days_items` is ordered most recent first, so index 0 is today.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoistStats {
    #[serde(default)]
    pub karma: f64,
    #[serde(default)]
    pub karma_trend: String,
    #[serde(default)]
    pub completed_count: i64,
    #[serde(default)]
    pub days_items: Vec<DayItem>,
    #[serde(default)]
    pub week_items: Vec<WeekItem>,
    #[serde(default)]
    pub goals: TodoistGoals,
}

impl TodoistStats {
    /// Tasks completed today, or 0 when the day series is empty.
    pub fn completed_today(&self) -> i64 {
        self.days_items
            .first()
            .map_or(0, |day| day.total_completed)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DayItem {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub total_completed: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeekItem {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub total_completed: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoistGoals {
    #[serde(default)]
    pub daily_goal: i64,
    #[serde(default)]
    pub weekly_goal: i64,
}
