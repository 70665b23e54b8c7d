use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use pulsedash::config::{HabiticaConfig, ProviderDefaults, TodoistConfig};
use pulsedash::providers::habitica::HabiticaClient;
use pulsedash::providers::todoist::TodoistClient;
use pulsedash::server::{DashState, dash_router};
use pulsedash::sync::{HabitSyncEngine, TaskSyncEngine};
use pulsedash::widget::WidgetService;
use pulsedash_schema::WidgetSnapshot;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

#[derive(Clone, Default)]
struct MockState {
    stats_down: bool,
    filter_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    todoist_auth: Arc<Mutex<Vec<String>>>,
}

fn unique_sqlite_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "pulsedash-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

async fn habitica_tasks(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("type").map(String::as_str) {
        Some("habits") => Json(json!({
            "success": true,
            "data": [
                { "id": "h1", "text": "Water", "type": "habit", "notes": "Goal: 8",
                  "counterUp": 6, "counterDown": 1 },
                { "id": "h2", "text": "Reading", "type": "habit", "notes": "Goal: 30",
                  "counterUp": 12, "counterDown": 4 },
                { "id": "h3", "text": "Stretch", "type": "habit", "notes": "",
                  "counterUp": 2, "counterDown": 0 }
            ]
        }))
        .into_response(),
        Some("dailys") => Json(json!({
            "success": true,
            "data": [
                { "id": "d1", "text": "Meditate", "type": "daily", "isDue": true, "completed": true },
                { "id": "d2", "text": "Journal", "type": "daily", "isDue": true, "completed": false },
                { "id": "d3", "text": "Gym", "type": "daily", "isDue": false, "completed": false }
            ]
        }))
        .into_response(),
        _ => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn todoist_filter(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.filter_queries.lock().unwrap().push(params);
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.todoist_auth.lock().unwrap().push(auth.to_string());
    }
    Json(json!({
        "results": [
            { "id": "t1", "content": "Pay rent", "project_id": "p1" },
            { "id": "t2", "content": "Call mom", "project_id": "p1" },
            { "id": "t3", "content": "Read", "project_id": "p2" }
        ],
        "next_cursor": null
    }))
}

async fn todoist_stats(State(state): State<MockState>) -> Response {
    if state.stats_down {
        return (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response();
    }
    Json(json!({
        "karma": 5120.0,
        "completed_count": 812,
        "days_items": [
            { "date": "2024-05-01", "total_completed": 4 },
            { "date": "2024-04-30", "total_completed": 9 }
        ],
        "goals": { "daily_goal": 6, "weekly_goal": 30 }
    }))
    .into_response()
}

struct Harness {
    app: Router,
    mock: MockState,
    sqlite_path: PathBuf,
}

impl Drop for Harness {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.sqlite_path.display()));
        }
    }
}

async fn harness(prefix: &str, stats_down: bool) -> Harness {
    let mock = MockState {
        stats_down,
        ..Default::default()
    };
    let upstream = Router::new()
        .route("/habitica/tasks/user", get(habitica_tasks))
        .route("/todoist/tasks/filter", get(todoist_filter))
        .route("/todoist/tasks/completed/stats", get(todoist_stats))
        .with_state(mock.clone());
    let base = spawn_test_server(upstream).await;

    let sqlite_path = unique_sqlite_path(prefix);
    let db = pulsedash::db::spawn(&format!("sqlite:{}", sqlite_path.display()))
        .await
        .expect("spawn db");

    let defaults = ProviderDefaults {
        retry_max_times: 0,
        ..Default::default()
    };
    let habitica_cfg = HabiticaConfig {
        api_url: base.join("/habitica").unwrap(),
        api_user: "user-1".to_string(),
        api_key: "key-1".to_string(),
        ..Default::default()
    }
    .resolve(&defaults);
    let todoist_cfg = TodoistConfig {
        api_url: base.join("/todoist").unwrap(),
        api_key: "todo-key".to_string(),
        ..Default::default()
    }
    .resolve(&defaults);

    let habitica = Arc::new(HabiticaClient::new(
        Arc::new(habitica_cfg),
        reqwest::Client::new(),
    ));
    let todoist = Arc::new(TodoistClient::new(
        Arc::new(todoist_cfg.clone()),
        reqwest::Client::new(),
    ));
    let rules: Arc<dyn pulsedash::db::RuleStore> = Arc::new(db.clone());

    let state = DashState {
        habit_sync: HabitSyncEngine::new(rules.clone(), habitica.clone()),
        task_sync: TaskSyncEngine::new(rules, habitica.clone()),
        widget: WidgetService::new(
            habitica,
            todoist,
            &todoist_cfg.task_query,
            todoist_cfg.task_limit,
        ),
        fitbit: None,
        db,
        inbound_key: None,
    };

    Harness {
        app: dash_router(state),
        mock,
        sqlite_path,
    }
}

async fn get_widget(app: &Router) -> (StatusCode, WidgetSnapshot, Value) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/widget").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let raw: Value = serde_json::from_slice(&bytes).unwrap();
    let snapshot: WidgetSnapshot = serde_json::from_value(raw.clone()).unwrap();
    (status, snapshot, raw)
}

#[tokio::test]
async fn widget_aggregates_all_four_reads() {
    let h = harness("widget-ok", false).await;

    let (status, snapshot, raw) = get_widget(&h.app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        snapshot,
        WidgetSnapshot {
            habitica_water_value: 5,
            habitica_water_goal: 8,
            habitica_read_value: 12,
            habitica_read_goal: 30,
            habitica_dailys_done: 1,
            habitica_dailys_due: 2,
            todoist_tasks_done: 4,
            todoist_tasks_goal: 6,
            todoist_tasks_due: 3,
            errors: Vec::new(),
        }
    );
    assert!(raw.get("errors").is_none(), "errors omitted when empty");

    let queries = h.mock.filter_queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["query"], "today | od");
    assert_eq!(queries[0]["limit"], "200");
    assert_eq!(
        *h.mock.todoist_auth.lock().unwrap(),
        vec!["Bearer todo-key".to_string()]
    );
}

#[tokio::test]
async fn failed_stats_read_returns_partial_snapshot_with_500() {
    let h = harness("widget-stats-down", true).await;

    let (status, snapshot, _) = get_widget(&h.app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(snapshot.errors.len(), 1);
    assert!(snapshot.errors[0].contains("503"), "{:?}", snapshot.errors);

    assert_eq!(snapshot.todoist_tasks_done, 0);
    assert_eq!(snapshot.todoist_tasks_goal, 0);
    assert_eq!(snapshot.todoist_tasks_due, 3);
    assert_eq!(snapshot.habitica_water_value, 5);
    assert_eq!(snapshot.habitica_read_goal, 30);
    assert_eq!(snapshot.habitica_dailys_due, 2);
}
