use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    routing::{get, post},
};
use base64::Engine as _;
use chrono::{TimeDelta, Utc};
use pulsedash::config::{FitbitConfig, FitbitResolvedConfig, ProviderDefaults};
use pulsedash::providers::fitbit::{
    Credential, CredentialManager, FitbitClient, MemoryTokenStore, TokenStore,
};
use pulsedash::{DashError, OauthError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    headers: HeaderMap,
    form: HashMap<String, String>,
}

#[derive(Clone, Default)]
struct CaptureState {
    reqs: Arc<Mutex<Vec<Captured>>>,
    reject_refresh: bool,
}

impl CaptureState {
    fn rejecting() -> Self {
        Self {
            reject_refresh: true,
            ..Default::default()
        }
    }

    fn paths(&self) -> Vec<String> {
        self.reqs
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.path.clone())
            .collect()
    }

    fn token_calls(&self) -> Vec<Captured> {
        self.reqs
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == "/oauth2/token")
            .cloned()
            .collect()
    }
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

async fn token_handler(
    State(state): State<CaptureState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    let form: HashMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();
    state.reqs.lock().unwrap().push(Captured {
        path: "/oauth2/token".to_string(),
        headers,
        form: form.clone(),
    });

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "access-from-code",
                "token_type": "Bearer",
                "expires_in": 28800,
                "refresh_token": "refresh-from-code",
                "user_id": "ABC123"
            })),
        ),
        Some("refresh_token") if state.reject_refresh => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        ),
        Some("refresh_token") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "access-from-refresh",
                "token_type": "Bearer",
                "expires_in": 28800,
                "refresh_token": "refresh-rotated"
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        ),
    }
}

async fn activity_handler(
    State(state): State<CaptureState>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    state.reqs.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        headers,
        form: HashMap::new(),
    });
    Json(json!({
        "activities": [
            { "name": "Walk", "duration": 900000 },
            { "name": "Run", "duration": 1800000 }
        ],
        "summary": { "steps": 8042, "veryActiveMinutes": 31 },
        "goals": { "activeMinutes": 30, "steps": 10000 }
    }))
}

async fn weight_handler(
    State(state): State<CaptureState>,
    uri: Uri,
    headers: HeaderMap,
) -> Json<Value> {
    state.reqs.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        headers,
        form: HashMap::new(),
    });
    Json(json!({
        "weight": [
            { "weight": 171.4, "date": "2024-04-30" },
            { "weight": 170.9, "date": "2024-05-01" }
        ]
    }))
}

async fn spawn_fitbit_mock(state: CaptureState) -> Url {
    let app = Router::new()
        .route("/oauth2/token", post(token_handler))
        .route("/1/user/-/activities/date/{file}", get(activity_handler))
        .route(
            "/1/user/-/body/log/weight/date/{date}/{range}",
            get(weight_handler),
        )
        .with_state(state);
    spawn_test_server(app).await
}

fn fitbit_cfg(base: &Url, callback_port: u16) -> FitbitResolvedConfig {
    let mut cfg = FitbitConfig {
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        callback_port,
        api_url: base.clone(),
        auth_url: Url::parse("http://oauth.test/authorize").unwrap(),
        token_url: base.join("/oauth2/token").unwrap(),
        ..Default::default()
    }
    .resolve(&ProviderDefaults {
        retry_max_times: 0,
        ..Default::default()
    });
    cfg.redirect_url = format!("http://localhost:{callback_port}");
    cfg
}

fn credential(access: &str, expires_in: TimeDelta) -> Credential {
    Credential {
        access_token: access.to_string(),
        token_type: "bearer".to_string(),
        refresh_token: "refresh-stored".to_string(),
        expiry: Utc::now() + expires_in,
    }
}

fn authorization(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    listener.local_addr().expect("local addr").port()
}

#[tokio::test]
async fn valid_stored_credential_is_used_without_refresh() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let store = Arc::new(MemoryTokenStore::new(Some(credential(
        "access-stored",
        TimeDelta::hours(1),
    ))));

    let manager = CredentialManager::bootstrap_with_prompt(
        Arc::new(fitbit_cfg(&base, 0)),
        store.clone(),
        reqwest::Client::new(),
        |_| panic!("no authorization expected"),
    )
    .await
    .expect("bootstrap");

    let client = FitbitClient::new(manager);
    let activity = client
        .activity(Utc::now().date_naive())
        .await
        .expect("activity");

    assert_eq!(activity.summary.steps, 8042);
    assert_eq!(activity.workouts().len(), 1);
    assert!(capture.token_calls().is_empty());
    assert_eq!(store.save_count().await, 0);

    let reqs = capture.reqs.lock().unwrap().clone();
    assert_eq!(reqs.len(), 1);
    assert_eq!(authorization(&reqs[0].headers), "Bearer access-stored");
}

#[tokio::test]
async fn expired_stored_credential_is_refreshed_and_persisted_at_startup() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let store = Arc::new(MemoryTokenStore::new(Some(credential(
        "access-stale",
        -TimeDelta::minutes(1),
    ))));

    let manager = CredentialManager::bootstrap_with_prompt(
        Arc::new(fitbit_cfg(&base, 0)),
        store.clone(),
        reqwest::Client::new(),
        |_| panic!("no authorization expected"),
    )
    .await
    .expect("bootstrap");

    let token_calls = capture.token_calls();
    assert_eq!(token_calls.len(), 1);
    assert_eq!(token_calls[0].form["grant_type"], "refresh_token");
    assert_eq!(token_calls[0].form["refresh_token"], "refresh-stored");

    let expected_basic = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("client-1:secret-1")
    );
    assert_eq!(authorization(&token_calls[0].headers), expected_basic);

    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.access_token, "access-from-refresh");
    assert_eq!(persisted.refresh_token, "refresh-rotated");
    assert!(persisted.expiry > Utc::now() + TimeDelta::hours(7));
    assert_eq!(store.save_count().await, 1);

    assert_eq!(manager.access_token().await.unwrap(), "access-from-refresh");
}

#[tokio::test]
async fn credential_expiring_at_runtime_refreshes_before_the_api_call() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let store = Arc::new(MemoryTokenStore::new(Some(credential(
        "access-short",
        TimeDelta::milliseconds(400),
    ))));

    let manager = CredentialManager::bootstrap_with_prompt(
        Arc::new(fitbit_cfg(&base, 0)),
        store.clone(),
        reqwest::Client::new(),
        |_| panic!("no authorization expected"),
    )
    .await
    .expect("bootstrap");
    assert!(capture.token_calls().is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;

    let client = FitbitClient::new(manager);
    let (a, b) = tokio::join!(
        client.weight_log(Utc::now().date_naive()),
        client.weight_log(Utc::now().date_naive())
    );
    assert_eq!(a.expect("first weight log").records.len(), 2);
    assert_eq!(b.expect("second weight log").records.len(), 2);

    let paths = capture.paths();
    assert_eq!(capture.token_calls().len(), 1, "single refresh for concurrent callers");
    assert_eq!(paths[0], "/oauth2/token");
    assert!(paths[1..].iter().all(|p| p.ends_with("/7d.json")));

    let reqs = capture.reqs.lock().unwrap().clone();
    for api_call in reqs.iter().skip(1) {
        assert_eq!(authorization(&api_call.headers), "Bearer access-from-refresh");
        assert_eq!(
            api_call.headers.get("accept-language").unwrap(),
            "en_US"
        );
    }
    assert_eq!(store.save_count().await, 1);
}

#[tokio::test]
async fn runtime_refresh_failure_errors_and_trips_fatal_signal() {
    let capture = CaptureState::rejecting();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let store = Arc::new(MemoryTokenStore::new(Some(credential(
        "access-short",
        TimeDelta::milliseconds(300),
    ))));

    let manager = CredentialManager::bootstrap_with_prompt(
        Arc::new(fitbit_cfg(&base, 0)),
        store,
        reqwest::Client::new(),
        |_| panic!("no authorization expected"),
    )
    .await
    .expect("bootstrap");
    let fatal = manager.fatal_signal();

    tokio::time::sleep(Duration::from_millis(500)).await;

    let err = FitbitClient::new(manager)
        .activity(Utc::now().date_naive())
        .await
        .unwrap_err();
    assert!(
        matches!(err, DashError::Authorization(OauthError::ServerResponse { .. })),
        "got {err:?}"
    );

    tokio::time::timeout(Duration::from_secs(1), fatal.notified())
        .await
        .expect("fatal signal raised");
    assert!(capture.paths().iter().all(|p| p == "/oauth2/token"));
}

#[tokio::test]
async fn startup_refresh_failure_is_an_authorization_error() {
    let capture = CaptureState::rejecting();
    let base = spawn_fitbit_mock(capture).await;
    let store = Arc::new(MemoryTokenStore::new(Some(credential(
        "access-stale",
        -TimeDelta::hours(1),
    ))));

    let result = CredentialManager::bootstrap_with_prompt(
        Arc::new(fitbit_cfg(&base, 0)),
        store.clone(),
        reqwest::Client::new(),
        |_| panic!("no authorization expected"),
    )
    .await;

    assert!(matches!(result, Err(DashError::Authorization(_))));
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn missing_credential_runs_the_interactive_authorization() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let port = free_port().await;
    let store = Arc::new(MemoryTokenStore::new(None));

    let (url_tx, mut url_rx) = tokio::sync::mpsc::unbounded_channel::<Url>();
    let bootstrap = tokio::spawn({
        let cfg = Arc::new(fitbit_cfg(&base, port));
        let store = store.clone();
        async move {
            CredentialManager::bootstrap_with_prompt(cfg, store, reqwest::Client::new(), |url| {
                url_tx.send(url.clone()).expect("send auth url");
            })
            .await
        }
    });

    let auth_url = url_rx.recv().await.expect("authorization url printed");
    let params: HashMap<String, String> = auth_url.query_pairs().into_owned().collect();
    assert_eq!(auth_url.path(), "/authorize");
    assert_eq!(params["response_type"], "code");
    assert_eq!(params["client_id"], "client-1");
    assert_eq!(params["code_challenge_method"], "S256");
    assert_eq!(params["scope"], "activity profile sleep nutrition weight");
    assert_eq!(params["redirect_uri"], format!("http://localhost:{port}"));
    let csrf = params["state"].clone();

    let http = reqwest::Client::new();
    let callback = format!("http://127.0.0.1:{port}/");

    let forged = http
        .get(&callback)
        .query(&[("code", "forged"), ("state", "not-the-state")])
        .send()
        .await
        .expect("forged callback");
    assert_eq!(forged.status(), StatusCode::BAD_REQUEST);

    let real = http
        .get(&callback)
        .query(&[("code", "code-123"), ("state", csrf.as_str())])
        .send()
        .await
        .expect("real callback");
    assert_eq!(real.status(), StatusCode::OK);

    let manager = bootstrap.await.unwrap().expect("bootstrap");
    assert_eq!(manager.access_token().await.unwrap(), "access-from-code");

    let token_calls = capture.token_calls();
    assert_eq!(token_calls.len(), 1);
    assert_eq!(token_calls[0].form["grant_type"], "authorization_code");
    assert_eq!(token_calls[0].form["code"], "code-123");
    assert!(token_calls[0].form.contains_key("code_verifier"));

    let persisted = store.load().await.unwrap();
    assert_eq!(persisted.refresh_token, "refresh-from-code");
    assert_eq!(store.save_count().await, 1);
}

#[tokio::test]
async fn denied_authorization_fails_the_bootstrap() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture.clone()).await;
    let port = free_port().await;

    let (url_tx, mut url_rx) = tokio::sync::mpsc::unbounded_channel::<Url>();
    let bootstrap = tokio::spawn({
        let cfg = Arc::new(fitbit_cfg(&base, port));
        async move {
            CredentialManager::bootstrap_with_prompt(
                cfg,
                Arc::new(MemoryTokenStore::new(None)),
                reqwest::Client::new(),
                |url| url_tx.send(url.clone()).expect("send auth url"),
            )
            .await
        }
    });

    let auth_url = url_rx.recv().await.expect("authorization url printed");
    let csrf = auth_url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("state parameter");

    let resp = reqwest::Client::new()
        .get(format!("http://127.0.0.1:{port}/"))
        .query(&[("error", "access_denied"), ("state", csrf.as_str())])
        .send()
        .await
        .expect("callback");
    assert_eq!(resp.status(), StatusCode::OK);

    let result = bootstrap.await.unwrap();
    assert!(matches!(
        result,
        Err(DashError::Authorization(OauthError::Denied { .. }))
    ));
    assert!(capture.token_calls().is_empty());
}

#[tokio::test]
async fn authorization_wait_honours_the_timeout() {
    let capture = CaptureState::default();
    let base = spawn_fitbit_mock(capture).await;
    let port = free_port().await;

    let mut cfg = fitbit_cfg(&base, port);
    cfg.authorization_timeout = Some(Duration::from_millis(200));

    let result = CredentialManager::bootstrap_with_prompt(
        Arc::new(cfg),
        Arc::new(MemoryTokenStore::new(None)),
        reqwest::Client::new(),
        |_| {},
    )
    .await;

    assert!(matches!(
        result,
        Err(DashError::Authorization(OauthError::Timeout(_)))
    ));
}
