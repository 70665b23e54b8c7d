use serde::{Deserialize, Serialize};

pub const ITEM_COMPLETED_EVENT: &str = "item:completed";

/// Payload delivered by a Todoist webhook.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TodoistWebhook {
    #[serde(default)]
    pub event_name: Option<String>,
    pub event_data: TodoistEvent,
}

impl TodoistWebhook {
    /// Events without a name are treated as completions.
    pub fn is_completion(&self) -> bool {
        self.event_name
            .as_deref()
            .is_none_or(|name| name == ITEM_COMPLETED_EVENT)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TodoistEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: String,
}
