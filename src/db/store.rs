use async_trait::async_trait;

use crate::db::DbActorHandle;
use crate::db::models::{HabitRule, ProjectRule, TextRule};
use crate::error::DashError;

/// Read-only rule lookups. A missing rule is `Ok(None)`, not an error.
#[async_trait]
pub trait RuleStore: Send + Sync {
    async fn habit_rule(&self, habit_id: &str) -> Result<Option<HabitRule>, DashError>;
    async fn text_rules(&self) -> Result<Vec<TextRule>, DashError>;
    async fn project_rule(&self, project_id: &str) -> Result<Option<ProjectRule>, DashError>;
}

#[async_trait]
impl RuleStore for DbActorHandle {
    async fn habit_rule(&self, habit_id: &str) -> Result<Option<HabitRule>, DashError> {
        self.get_habit_rule(habit_id).await
    }

    async fn text_rules(&self) -> Result<Vec<TextRule>, DashError> {
        self.list_text_rules().await
    }

    async fn project_rule(&self, project_id: &str) -> Result<Option<ProjectRule>, DashError> {
        self.get_project_rule(project_id).await
    }
}
