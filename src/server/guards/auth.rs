use crate::server::router::DashState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

fn extract_header_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Webhook senders can only be configured with a URL, so `?key=` is accepted too.
fn extract_query_token(query: Option<&str>) -> Option<String> {
    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "key")
            .map(|(_, v)| v.into_owned())
    })
}

/// Passes every request when no inbound key is configured.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<DashState> for RequireKeyAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DashState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.inbound_key.as_deref() else {
            return Ok(RequireKeyAuth);
        };

        let token =
            extract_header_token(&parts.headers).or_else(|| extract_query_token(parts.uri.query()));

        match token {
            Some(key) if bool::from(key.as_bytes().ct_eq(expected.as_bytes())) => {
                Ok(RequireKeyAuth)
            }
            Some(_) => Err(AuthError::InvalidKey),
            None => Err(AuthError::MissingKey),
        }
    }
}

pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::MissingKey => "Missing API key",
            AuthError::InvalidKey => "Invalid API key",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}
