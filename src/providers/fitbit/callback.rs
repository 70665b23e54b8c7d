use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use oauth2::AuthorizationCode;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::{info, warn};

use crate::error::OauthError;

type CallbackOutcome = Result<String, OauthError>;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    tx: Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>,
}

/// Short-lived HTTP listener that receives the authorization redirect.
///
/// Serving stops once a code (or a provider error) has been delivered, or when the
/// listener is dropped.
pub struct CallbackListener {
    rx: oneshot::Receiver<CallbackOutcome>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl CallbackListener {
    pub async fn bind(addr: SocketAddr, expected_state: &str) -> Result<Self, OauthError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(OauthError::Listener)?;
        let local_addr = listener.local_addr().map_err(OauthError::Listener)?;

        let (tx, rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let state = CallbackState {
            expected_state: Arc::from(expected_state),
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route("/", get(receive_callback))
            .with_state(state);

        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                warn!("authorization callback listener stopped with error: {e}");
            }
        });

        info!(%local_addr, "waiting for the authorization callback");
        Ok(Self {
            rx,
            shutdown: Some(shutdown_tx),
        })
    }

    /// Suspend until the callback delivers a code. `None` waits indefinitely.
    pub async fn wait(mut self, timeout: Option<Duration>) -> Result<AuthorizationCode, OauthError> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, &mut self.rx)
                .await
                .map_err(|_| OauthError::Timeout(limit))?,
            None => (&mut self.rx).await,
        };

        let code = received.map_err(|_| OauthError::CallbackClosed)??;
        Ok(AuthorizationCode::new(code))
    }
}

impl Drop for CallbackListener {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn receive_callback(
    State(state): State<CallbackState>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, &'static str) {
    if query.state.as_deref() != Some(&*state.expected_state) {
        warn!("authorization callback with unexpected state ignored");
        return (StatusCode::BAD_REQUEST, "state mismatch");
    }

    let outcome = match (query.code, query.error) {
        (Some(code), _) => Ok(code),
        (None, Some(error)) => Err(OauthError::Denied {
            error,
            description: query.error_description,
        }),
        (None, None) => return (StatusCode::BAD_REQUEST, "missing code"),
    };
    let denied = outcome.is_err();

    match state.tx.lock().await.take() {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => return (StatusCode::GONE, "authorization already completed"),
    }

    if denied {
        (StatusCode::OK, "Authorization was denied. You can close this window.")
    } else {
        (StatusCode::OK, "Authorization complete. You can close this window.")
    }
}
