use crate::error::DashError;
use crate::server::router::DashState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

pub fn router() -> Router<DashState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<DashState>) -> Result<Response, DashError> {
    let db = state.db.health().await?;
    let status = if db.up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "status": if db.up { "up" } else { "down" },
        "open_connections": db.open_connections,
        "idle_connections": db.idle_connections,
    });
    Ok((status, Json(body)).into_response())
}
