use serde::{Deserialize, Serialize};

/// Composite dashboard report assembled from the habit tracker and the task manager.
///
/// Fields owed by a failed upstream read stay at zero; the failure is described in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WidgetSnapshot {
    pub habitica_water_value: i64,
    pub habitica_water_goal: i64,
    pub habitica_read_value: i64,
    pub habitica_read_goal: i64,
    pub habitica_dailys_done: i64,
    pub habitica_dailys_due: i64,
    pub todoist_tasks_done: i64,
    pub todoist_tasks_goal: i64,
    pub todoist_tasks_due: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl WidgetSnapshot {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}
