use crate::error::DashError;
use crate::providers::fitbit::FitbitClient;
use crate::server::router::DashState;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use pulsedash_schema::fitbit::{Activity, ActivityGoals, ActivitySummary};
use serde::Serialize;
use serde_json::json;

pub fn router() -> Router<DashState> {
    Router::new()
        .route("/fitbit/activity", get(activity))
        .route("/fitbit/weight", get(weight))
}

#[derive(Debug, Serialize)]
struct ActivityView {
    summary: ActivitySummary,
    goals: ActivityGoals,
    workouts: Vec<Activity>,
}

fn disabled() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": { "code": "DISABLED", "message": "Fitness integration is disabled." } })),
    )
        .into_response()
}

fn client(state: &DashState) -> Result<&FitbitClient, Response> {
    state.fitbit.as_ref().ok_or_else(disabled)
}

async fn activity(State(state): State<DashState>) -> Result<Response, Response> {
    let client = client(&state)?;
    let today = Local::now().date_naive();
    let resp = client
        .activity(today)
        .await
        .map_err(IntoResponse::into_response)?;

    Ok(Json(ActivityView {
        workouts: resp.workouts(),
        summary: resp.summary,
        goals: resp.goals,
    })
    .into_response())
}

async fn weight(State(state): State<DashState>) -> Result<Response, Response> {
    let client = client(&state)?;
    let today = Local::now().date_naive();
    let log = client
        .weight_log(today)
        .await
        .map_err(DashError::into_response)?;
    Ok(Json(log).into_response())
}
