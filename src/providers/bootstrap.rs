use crate::config::Config;
use crate::error::DashError;
use crate::providers::fitbit::{CredentialManager, FileTokenStore, FitbitClient};
use crate::providers::habitica::HabiticaClient;
use crate::providers::todoist::TodoistClient;
use crate::providers::upstream;
use std::sync::Arc;
use tracing::info;

/// Upstream clients for every configured service.
///
/// Kept as a plain struct; there are exactly three services.
#[derive(Clone)]
pub struct Providers {
    pub habitica: Arc<HabiticaClient>,
    pub todoist: Arc<TodoistClient>,
    pub fitbit: Option<FitbitClient>,
}

impl Providers {
    /// Build clients and, when enabled, run the fitness credential bootstrap (which may block
    /// on interactive authorization).
    pub async fn spawn(cfg: &Config) -> Result<Self, DashError> {
        let defaults = &cfg.providers.defaults;
        let habitica_cfg = Arc::new(cfg.habitica());
        let todoist_cfg = Arc::new(cfg.todoist());

        info!(
            providers_defaults_proxy = %defaults.proxy.as_ref().map_or("<none>", |u| u.as_str()),
            providers_defaults_enable_multiplexing = defaults.enable_multiplexing,
            providers_defaults_retry_max_times = defaults.retry_max_times,
            "Provider defaults loaded"
        );
        info!(
            habitica_api_url = %habitica_cfg.api_url,
            habitica_client = %habitica_cfg.client_id,
            habitica_retry_max_times = habitica_cfg.retry_max_times,
            "Habitica config (effective)"
        );
        info!(
            todoist_api_url = %todoist_cfg.api_url,
            todoist_task_query = %todoist_cfg.task_query,
            todoist_task_limit = todoist_cfg.task_limit,
            todoist_retry_max_times = todoist_cfg.retry_max_times,
            "Todoist config (effective)"
        );

        let habitica = Arc::new(HabiticaClient::from_config(habitica_cfg)?);
        let todoist = Arc::new(TodoistClient::from_config(todoist_cfg)?);

        let fitbit = if cfg.providers.fitbit.enabled {
            let fitbit_cfg = Arc::new(cfg.fitbit());
            info!(
                fitbit_redirect_url = %fitbit_cfg.redirect_url,
                fitbit_callback_port = fitbit_cfg.callback_port,
                fitbit_token_path = %fitbit_cfg.token_path.display(),
                fitbit_expiry_skew_secs = fitbit_cfg.expiry_skew.num_seconds(),
                "Fitbit config (effective)"
            );
            let http = upstream::build_client(
                upstream::DASH_USER_AGENT,
                fitbit_cfg.proxy.as_ref(),
                fitbit_cfg.enable_multiplexing,
            )?;
            let store = Arc::new(FileTokenStore::new(fitbit_cfg.token_path.clone()));
            let manager = CredentialManager::bootstrap(fitbit_cfg, store, http).await?;
            Some(FitbitClient::new(manager))
        } else {
            info!("Fitbit integration disabled");
            None
        };

        Ok(Self {
            habitica,
            todoist,
            fitbit,
        })
    }
}
