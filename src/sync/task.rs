use std::sync::Arc;
use tracing::info;

use crate::db::RuleStore;
use crate::error::DashError;
use crate::providers::HabitScorer;

/// Which rule scored a completed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Text { rule: String, habit_id: String },
    Project { rule: String, habit_id: String },
}

impl TaskOutcome {
    pub fn habit_id(&self) -> &str {
        match self {
            TaskOutcome::Text { habit_id, .. } | TaskOutcome::Project { habit_id, .. } => habit_id,
        }
    }
}

/// Maps completed tasks onto habits: text prefix rules first, then the project rule.
#[derive(Clone)]
pub struct TaskSyncEngine {
    rules: Arc<dyn RuleStore>,
    scorer: Arc<dyn HabitScorer>,
}

impl TaskSyncEngine {
    pub fn new(rules: Arc<dyn RuleStore>, scorer: Arc<dyn HabitScorer>) -> Self {
        Self { rules, scorer }
    }

    /// A task matching neither a text rule nor its project's rule is a `NotFound` error.
    pub async fn on_task_completed(
        &self,
        task_text: &str,
        project_id: &str,
    ) -> Result<TaskOutcome, DashError> {
        let text_rules = self.rules.text_rules().await?;
        let outcome = if let Some(rule) = text_rules.into_iter().find(|r| r.matches(task_text)) {
            TaskOutcome::Text {
                rule: rule.name,
                habit_id: rule.habit_id,
            }
        } else {
            let rule = self.rules.project_rule(project_id).await?.ok_or_else(|| {
                DashError::NotFound(format!("no task rule for project {project_id}"))
            })?;
            TaskOutcome::Project {
                rule: rule.name,
                habit_id: rule.habit_id,
            }
        };

        self.scorer.score_up(outcome.habit_id()).await?;
        info!(project_id, ?outcome, "completed task scored");
        Ok(outcome)
    }
}
