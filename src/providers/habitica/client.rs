use async_trait::async_trait;
use pulsedash_schema::{Daily, Habit, HabiticaEnvelope};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::SERVICE;
use crate::config::HabiticaResolvedConfig;
use crate::error::DashError;
use crate::providers::upstream::{self, get_json_with_retry};
use crate::providers::{HabitReader, HabitScorer};

/// Habit tracker API client (`x-api-user` / `x-api-key` auth).
#[derive(Clone)]
pub struct HabiticaClient {
    cfg: Arc<HabiticaResolvedConfig>,
    http: reqwest::Client,
}

impl HabiticaClient {
    pub fn new(cfg: Arc<HabiticaResolvedConfig>, http: reqwest::Client) -> Self {
        Self { cfg, http }
    }

    pub fn from_config(cfg: Arc<HabiticaResolvedConfig>) -> Result<Self, DashError> {
        let http = upstream::build_client(
            upstream::DASH_USER_AGENT,
            cfg.proxy.as_ref(),
            cfg.enable_multiplexing,
        )?;
        Ok(Self::new(cfg, http))
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashError> {
        let base = self.cfg.api_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("x-api-user", &self.cfg.api_user)
            .header("x-api-key", &self.cfg.api_key)
            .header("x-client", &self.cfg.client_id)
    }

    async fn list_tasks<T: DeserializeOwned>(&self, kind: &str) -> Result<Vec<T>, DashError> {
        let url = self.endpoint("tasks/user")?;
        let envelope: HabiticaEnvelope<Vec<T>> = get_json_with_retry(
            SERVICE,
            &self.http,
            &url,
            self.cfg.retry_max_times,
            |req| self.authorize(req).query(&[("type", kind)]),
        )
        .await?;

        if !envelope.success {
            return Err(DashError::UpstreamRejected { service: SERVICE });
        }
        debug!(kind, count = envelope.data.len(), "habitica tasks fetched");
        Ok(envelope.data)
    }
}

#[async_trait]
impl HabitReader for HabiticaClient {
    async fn habits(&self) -> Result<Vec<Habit>, DashError> {
        self.list_tasks("habits").await
    }

    async fn dailies(&self) -> Result<Vec<Daily>, DashError> {
        self.list_tasks("dailys").await
    }
}

#[async_trait]
impl HabitScorer for HabiticaClient {
    /// Scoring is not idempotent, so it is sent exactly once.
    async fn score_up(&self, task_id: &str) -> Result<(), DashError> {
        let url = self.endpoint(&format!("tasks/{task_id}/score/up"))?;
        let resp = self.authorize(self.http.post(url)).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            // Any other 2xx still counts as a failed score.
            upstream::ensure_success(SERVICE, resp).await?;
            return Err(DashError::UpstreamStatus {
                service: SERVICE,
                status,
            });
        }
        info!(task_id, "habitica task scored up");
        Ok(())
    }
}
