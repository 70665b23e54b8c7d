use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error as ThisError;

use super::IsRetryable;
use super::oauth::OauthError;

#[derive(Debug, ThisError)]
pub enum DashError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{service} answered with status {status}")]
    UpstreamStatus {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} returned an unsuccessful envelope")]
    UpstreamRejected { service: &'static str },

    #[error("authorization failed: {0}")]
    Authorization(#[from] OauthError),

    #[error("no stored credential at {}", .0.display())]
    CredentialNotFound(PathBuf),

    #[error("stored credential is malformed: {0}")]
    CredentialDecode(String),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl DashError {
    /// Missing records and unreadable storage, as opposed to upstream or auth failures.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            DashError::CredentialNotFound(_)
                | DashError::CredentialDecode(_)
                | DashError::IoError(_)
                | DashError::DatabaseError(_)
                | DashError::RactorError(_)
        )
    }
}

impl IntoResponse for DashError {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match &self {
            DashError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", what.clone()),

            DashError::DatabaseError(_)
            | DashError::RactorError(_)
            | DashError::IoError(_)
            | DashError::CredentialNotFound(_)
            | DashError::CredentialDecode(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred.".to_string(),
            ),

            DashError::Authorization(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "NO_CREDENTIAL",
                "Upstream credential is unavailable.".to_string(),
            ),

            DashError::JsonError(_) | DashError::UpstreamRejected { .. } => (
                StatusCode::BAD_GATEWAY,
                "BAD_UPSTREAM_PAYLOAD",
                "Failed to parse upstream response.".to_string(),
            ),

            DashError::ReqwestError(_) | DashError::UrlError(_) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Upstream service error.".to_string(),
            ),

            DashError::UpstreamStatus { status, .. } => {
                let (code, msg) = match *status {
                    StatusCode::TOO_MANY_REQUESTS => ("RATE_LIMIT", "Upstream rate limit exceeded."),
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };
                (StatusCode::BAD_GATEWAY, code, msg.to_string())
            }
        };

        let body = ApiErrorBody {
            inner: ApiErrorObject {
                code: code.to_string(),
                message,
                details: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}

impl IsRetryable for DashError {
    fn is_retryable(&self) -> bool {
        match self {
            DashError::ReqwestError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            DashError::UpstreamStatus { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            DashError::Authorization(e) => e.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_retry_client_errors_do_not() {
        let transient = DashError::UpstreamStatus {
            service: "habitica",
            status: StatusCode::SERVICE_UNAVAILABLE,
        };
        let rejected = DashError::UpstreamStatus {
            service: "habitica",
            status: StatusCode::UNAUTHORIZED,
        };
        assert!(transient.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!DashError::NotFound("rule".to_string()).is_retryable());
    }

    #[test]
    fn persistence_class_covers_storage_failures() {
        assert!(DashError::CredentialNotFound(PathBuf::from("token.json")).is_persistence());
        assert!(DashError::CredentialDecode("bad".to_string()).is_persistence());
        assert!(!DashError::NotFound("rule".to_string()).is_persistence());
    }

    #[test]
    fn not_found_maps_to_404() {
        let resp = DashError::NotFound("no rule for project 7".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
