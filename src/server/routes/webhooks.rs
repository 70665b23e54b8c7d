use crate::server::router::DashState;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use pulsedash_schema::{HabiticaWebhook, TodoistWebhook};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

pub fn router() -> Router<DashState> {
    Router::new()
        .route("/habiticaEvent", post(habitica_event))
        .route("/todoistEvent", post(todoist_event))
}

/// Decodes the body regardless of content type; senders do not always set one.
fn decode<T: DeserializeOwned>(source: &'static str, body: &[u8]) -> Result<T, StatusCode> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(source, "undecodable webhook body: {e}");
        StatusCode::BAD_REQUEST
    })
}

async fn habitica_event(State(state): State<DashState>, body: Bytes) -> StatusCode {
    let event: HabiticaWebhook = match decode("habitica", &body) {
        Ok(event) => event,
        Err(status) => return status,
    };

    if !event.task.is_habit() {
        info!(task_type = %event.task.task_type, "ignoring non-habit habitica event");
        return StatusCode::OK;
    }

    info!(id = %event.task.id, name = %event.task.text, counter_up = event.task.counter_up, "checking habit");
    if let Err(e) = state
        .habit_sync
        .on_habit_progress(&event.task.id, event.task.counter_up)
        .await
    {
        error!(id = %event.task.id, "error checking habit: {e}");
    }
    StatusCode::OK
}

/// Todoist redelivers anything but a 2xx, so an undecodable body is logged and acknowledged.
async fn todoist_event(State(state): State<DashState>, body: Bytes) -> StatusCode {
    let Ok(event) = decode::<TodoistWebhook>("todoist", &body) else {
        return StatusCode::OK;
    };

    if !event.is_completion() {
        info!(event_name = ?event.event_name, "ignoring todoist event");
        return StatusCode::OK;
    }

    let task = &event.event_data;
    info!(task = %task.content, project_id = %task.project_id, "got todoist completion");
    if let Err(e) = state
        .task_sync
        .on_task_completed(&task.content, &task.project_id)
        .await
    {
        error!(task = %task.content, "error scoring task: {e}");
    }
    StatusCode::OK
}
