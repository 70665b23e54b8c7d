use async_trait::async_trait;
use pulsedash_schema::{TodoistStats, TodoistTask, TodoistTaskPage};
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::SERVICE;
use crate::config::TodoistResolvedConfig;
use crate::error::DashError;
use crate::providers::TaskReader;
use crate::providers::upstream::{self, get_json_with_retry};

/// Task manager API client (Bearer token auth).
#[derive(Clone)]
pub struct TodoistClient {
    cfg: Arc<TodoistResolvedConfig>,
    http: reqwest::Client,
}

impl TodoistClient {
    pub fn new(cfg: Arc<TodoistResolvedConfig>, http: reqwest::Client) -> Self {
        Self { cfg, http }
    }

    pub fn from_config(cfg: Arc<TodoistResolvedConfig>) -> Result<Self, DashError> {
        let http = upstream::build_client(
            upstream::DASH_USER_AGENT,
            cfg.proxy.as_ref(),
            cfg.enable_multiplexing,
        )?;
        Ok(Self::new(cfg, http))
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashError> {
        let base = self.cfg.api_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }
}

#[async_trait]
impl TaskReader for TodoistClient {
    /// Only the first page is read; `limit` bounds its size.
    async fn filter_tasks(&self, query: &str, limit: u32) -> Result<Vec<TodoistTask>, DashError> {
        let url = self.endpoint("tasks/filter")?;
        let limit = limit.to_string();
        let page: TodoistTaskPage = get_json_with_retry(
            SERVICE,
            &self.http,
            &url,
            self.cfg.retry_max_times,
            |req| {
                req.bearer_auth(&self.cfg.api_key)
                    .query(&[("query", query), ("limit", limit.as_str())])
            },
        )
        .await?;

        debug!(
            query,
            count = page.results.len(),
            has_more = page.next_cursor.is_some(),
            "todoist tasks fetched"
        );
        Ok(page.results)
    }

    async fn completed_stats(&self) -> Result<TodoistStats, DashError> {
        let url = self.endpoint("tasks/completed/stats")?;
        get_json_with_retry(SERVICE, &self.http, &url, self.cfg.retry_max_times, |req| {
            req.bearer_auth(&self.cfg.api_key)
        })
        .await
    }
}
