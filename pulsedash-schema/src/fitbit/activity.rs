use serde::{Deserialize, Serialize};

/// Daily activity summary from `GET /1/user/-/activities/date/{date}.json`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ActivityResponse {
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub summary: ActivitySummary,
    #[serde(default)]
    pub goals: ActivityGoals,
}

impl ActivityResponse {
    /// Logged activities excluding plain walks.
    pub fn workouts(&self) -> Vec<Activity> {
        self.activities
            .iter()
            .filter(|a| a.name != "Walk")
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Activity {
    #[serde(default)]
    pub name: String,
    /// Milliseconds.
    #[serde(default)]
    pub duration: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(default)]
    pub steps: i64,
    #[serde(default)]
    pub very_active_minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityGoals {
    #[serde(default)]
    pub active_minutes: i64,
    #[serde(default)]
    pub steps: i64,
}
