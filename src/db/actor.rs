use crate::db::models::{DbHealth, HabitRule, ProjectRule, TextRule};
use crate::db::schema::SQLITE_INIT;
use crate::error::DashError;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Habit rule keyed by habit id.
    GetHabitRule(String, RpcReplyPort<Result<Option<HabitRule>, DashError>>),

    /// All text rules, `priority ASC, id ASC`.
    ListTextRules(RpcReplyPort<Result<Vec<TextRule>, DashError>>),

    /// Project rule keyed by project id.
    GetProjectRule(String, RpcReplyPort<Result<Option<ProjectRule>, DashError>>),

    /// Round-trip a trivial query and report pool usage.
    Health(RpcReplyPort<DbHealth>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn get_habit_rule(&self, habit_id: &str) -> Result<Option<HabitRule>, DashError> {
        ractor::call!(self.actor, DbActorMessage::GetHabitRule, habit_id.to_string()).map_err(
            |e| DashError::RactorError(format!("DbActor GetHabitRule RPC failed: {e}")),
        )?
    }

    pub async fn list_text_rules(&self) -> Result<Vec<TextRule>, DashError> {
        ractor::call!(self.actor, DbActorMessage::ListTextRules).map_err(|e| {
            DashError::RactorError(format!("DbActor ListTextRules RPC failed: {e}"))
        })?
    }

    pub async fn get_project_rule(
        &self,
        project_id: &str,
    ) -> Result<Option<ProjectRule>, DashError> {
        ractor::call!(
            self.actor,
            DbActorMessage::GetProjectRule,
            project_id.to_string()
        )
        .map_err(|e| DashError::RactorError(format!("DbActor GetProjectRule RPC failed: {e}")))?
    }

    pub async fn health(&self) -> Result<DbHealth, DashError> {
        ractor::call!(self.actor, DbActorMessage::Health)
            .map_err(|e| DashError::RactorError(format!("DbActor Health RPC failed: {e}")))
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::GetHabitRule(habit_id, reply) => {
                let res = Self::get_habit_rule(&state.pool, &habit_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListTextRules(reply) => {
                let res = Self::list_text_rules(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetProjectRule(project_id, reply) => {
                let res = Self::get_project_rule(&state.pool, &project_id).await;
                let _ = reply.send(res);
            }
            DbActorMessage::Health(reply) => {
                let up = sqlx::query_scalar::<_, i64>("SELECT 1")
                    .fetch_one(&state.pool)
                    .await
                    .is_ok();
                let _ = reply.send(DbHealth {
                    up,
                    open_connections: state.pool.size(),
                    idle_connections: state.pool.num_idle(),
                });
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn get_habit_rule(
        pool: &SqlitePool,
        habit_id: &str,
    ) -> Result<Option<HabitRule>, DashError> {
        let row = sqlx::query_as::<_, HabitRule>(
            r"
            SELECT name, habit_id, daily_id, min_score
            FROM habitica_habit_rule
            WHERE habit_id = ?
            ",
        )
        .bind(habit_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    async fn list_text_rules(pool: &SqlitePool) -> Result<Vec<TextRule>, DashError> {
        let rows = sqlx::query_as::<_, TextRule>(
            r"
            SELECT name, rule_text, habit_id
            FROM todoist_text_rule
            ORDER BY priority ASC, id ASC
            ",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn get_project_rule(
        pool: &SqlitePool,
        project_id: &str,
    ) -> Result<Option<ProjectRule>, DashError> {
        let row = sqlx::query_as::<_, ProjectRule>(
            r"
            SELECT name, project_id, habit_id
            FROM todoist_project_rule
            WHERE project_id = ?
            ",
        )
        .bind(project_id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }
}

pub async fn spawn(database_url: &str) -> Result<DbActorHandle, DashError> {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .map_err(|e| DashError::RactorError(format!("failed to spawn DbActor: {e}")))?;

    Ok(DbActorHandle { actor })
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), DashError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() || s.lines().all(|l| l.trim().is_empty() || l.trim().starts_with("--")) {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
