use serde::{Deserialize, Serialize};

pub const HABIT_TASK_TYPE: &str = "habit";

/// Payload delivered by Habitica's task-activity webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HabiticaWebhook {
    #[serde(default, rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub direction: String,
    pub task: HabiticaWebhookTask,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabiticaWebhookTask {
    pub id: String,
    #[serde(default, rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub counter_up: i64,
    #[serde(default)]
    pub counter_down: i64,
}

impl HabiticaWebhookTask {
    pub fn is_habit(&self) -> bool {
        self.task_type == HABIT_TASK_TYPE
    }
}
