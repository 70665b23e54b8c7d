use serde::{Deserialize, Serialize};

/// Standard Habitica response envelope: `{ "success": bool, "data": T }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HabiticaEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: T,
}

/// Fields shared by every Habitica task type.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCommon {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Counter-style task with up/down increments.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    #[serde(flatten)]
    pub task: TaskCommon,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub counter_up: i64,
    #[serde(default)]
    pub counter_down: i64,
    #[serde(default)]
    pub frequency: String,
}

impl Habit {
    /// Parse the numeric goal from notes such as `Goal: 8`.
    ///
    /// The characters of `"Goal: "` are stripped from both ends before parsing, so `8`,
    /// `Goal: 8` and `Goal:8 ` all yield 8.
    pub fn parse_goal(&self) -> Option<i64> {
        self.task
            .notes
            .trim_matches(|c| "Goal: ".contains(c))
            .parse()
            .ok()
    }
}

/// Recurring task.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Daily {
    #[serde(flatten)]
    pub task: TaskCommon,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub is_due: bool,
    #[serde(default)]
    pub streak: i64,
    #[serde(default)]
    pub repeat: Repeat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct Repeat {
    #[serde(default, rename = "m")]
    pub mon: bool,
    #[serde(default, rename = "t")]
    pub tue: bool,
    #[serde(default, rename = "w")]
    pub wed: bool,
    #[serde(default, rename = "th")]
    pub thu: bool,
    #[serde(default, rename = "f")]
    pub fri: bool,
    #[serde(default, rename = "s")]
    pub sat: bool,
    #[serde(default, rename = "su")]
    pub sun: bool,
}
