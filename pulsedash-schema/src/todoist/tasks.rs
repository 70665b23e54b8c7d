use serde::{Deserialize, Serialize};

/// One page returned by `GET /tasks/filter`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoistTaskPage {
    #[serde(default)]
    pub results: Vec<TodoistTask>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TodoistTask {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub due: Option<Due>,
    #[serde(default)]
    pub duration: Option<TaskDuration>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Due {
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskDuration {
    pub amount: u32,
    pub unit: String,
}
