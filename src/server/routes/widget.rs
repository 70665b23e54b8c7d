use crate::server::router::DashState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

pub fn router() -> Router<DashState> {
    Router::new().route("/widget", get(widget_snapshot))
}

/// The partial snapshot is returned even when a read failed, with status 500.
async fn widget_snapshot(State(state): State<DashState>) -> Response {
    let snapshot = state.widget.get_snapshot().await;
    let status = if snapshot.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(snapshot)).into_response()
}
