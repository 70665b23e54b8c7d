use crate::db::DbActorHandle;
use crate::providers::fitbit::FitbitClient;
use crate::server::guards::auth::RequireKeyAuth;
use crate::server::routes::{fitbit, health, webhooks, widget};
use crate::sync::{HabitSyncEngine, TaskSyncEngine};
use crate::widget::WidgetService;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 16 base64url characters.
fn generate_request_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Clone)]
pub struct DashState {
    pub habit_sync: HabitSyncEngine,
    pub task_sync: TaskSyncEngine,
    pub widget: WidgetService,
    /// `None` when the fitness integration is disabled.
    pub fitbit: Option<FitbitClient>,
    pub db: DbActorHandle,
    pub inbound_key: Option<Arc<str>>,
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// One line per request; the level follows the status class.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let protocol = format!("{:?}", req.version());
    let headers = req.headers();

    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let line = format!(
        "| {:>3} | {request_id} | {:^7} | {protocol:<8} | {path} | {}ms | {user_agent}",
        status.as_u16(),
        method.as_str(),
        start.elapsed().as_millis(),
    );
    match status {
        s if s.is_server_error() => error!("{line}"),
        s if s.is_client_error() => warn!("{line}"),
        _ => info!("{line}"),
    }

    resp
}

pub fn dash_router(state: DashState) -> Router {
    let guarded = Router::new()
        .merge(webhooks::router())
        .merge(widget::router())
        .merge(fitbit::router())
        .layer(middleware::from_extractor_with_state::<RequireKeyAuth, _>(
            state.clone(),
        ));

    Router::new()
        .merge(guarded)
        .merge(health::router())
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
