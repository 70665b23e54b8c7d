use chrono::NaiveDate;
use pulsedash_schema::{ActivityResponse, WeightResponse};
use reqwest::header::ACCEPT_LANGUAGE;
use std::sync::Arc;
use url::Url;

use super::CredentialManager;
use crate::error::DashError;

/// Fitness Web API reads, authenticated through [`CredentialManager`].
#[derive(Clone)]
pub struct FitbitClient {
    manager: Arc<CredentialManager>,
}

impl FitbitClient {
    pub fn new(manager: Arc<CredentialManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<CredentialManager> {
        &self.manager
    }

    fn endpoint(&self, path: &str) -> Result<Url, DashError> {
        let base = self.manager.config().api_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Activity summary, goals and logged activities for `date`.
    pub async fn activity(&self, date: NaiveDate) -> Result<ActivityResponse, DashError> {
        let url = self.endpoint(&format!(
            "1/user/-/activities/date/{}.json",
            date.format("%Y-%m-%d")
        ))?;
        self.manager.get_json(&url, |req| req).await
    }

    /// Weight log for the seven days ending at `date` (US units).
    pub async fn weight_log(&self, date: NaiveDate) -> Result<WeightResponse, DashError> {
        let url = self.endpoint(&format!(
            "1/user/-/body/log/weight/date/{}/7d.json",
            date.format("%Y-%m-%d")
        ))?;
        self.manager
            .get_json(&url, |req| req.header(ACCEPT_LANGUAGE, "en_US"))
            .await
    }
}
