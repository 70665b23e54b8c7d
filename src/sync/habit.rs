use std::sync::Arc;
use tracing::{debug, info};

use crate::db::RuleStore;
use crate::error::DashError;
use crate::providers::HabitScorer;

/// Scores a daily when a habit counter hits its configured threshold.
#[derive(Clone)]
pub struct HabitSyncEngine {
    rules: Arc<dyn RuleStore>,
    scorer: Arc<dyn HabitScorer>,
}

impl HabitSyncEngine {
    pub fn new(rules: Arc<dyn RuleStore>, scorer: Arc<dyn HabitScorer>) -> Self {
        Self { rules, scorer }
    }

    /// Returns whether a score was sent. Only exact equality with `min_score` triggers,
    /// so the daily is scored once on the way up; repeated events are not deduplicated.
    pub async fn on_habit_progress(
        &self,
        habit_id: &str,
        current_score: i64,
    ) -> Result<bool, DashError> {
        let Some(rule) = self.rules.habit_rule(habit_id).await? else {
            debug!(habit_id, "no habit rule; nothing to do");
            return Ok(false);
        };

        if current_score != rule.min_score {
            debug!(
                habit_id,
                current_score,
                min_score = rule.min_score,
                "habit below or past threshold"
            );
            return Ok(false);
        }

        self.scorer.score_up(&rule.daily_id).await?;
        info!(habit_id, daily_id = %rule.daily_id, rule = %rule.name, "habit threshold reached; daily scored");
        Ok(true)
    }
}
