use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderDefaults;

/// Task manager configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TodoistConfig {
    /// TOML: `providers.todoist.api_url`. Default: `https://api.todoist.com/api/v1`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Bearer token. Required.
    #[serde(default)]
    pub api_key: String,

    /// Filter used to count tasks due today.
    /// TOML: `providers.todoist.task_query`. Default: `today | od`.
    #[serde(default = "default_task_query")]
    pub task_query: String,

    /// Page size for the filter call. Default: `200`.
    #[serde(default = "default_task_limit")]
    pub task_limit: u32,

    #[serde(default)]
    pub proxy: Option<Url>,

    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct TodoistResolvedConfig {
    pub api_url: Url,
    pub api_key: String,
    pub task_query: String,
    pub task_limit: u32,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl TodoistConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> TodoistResolvedConfig {
        TodoistResolvedConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            task_query: self.task_query.clone(),
            task_limit: self.task_limit,
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            task_query: default_task_query(),
            task_limit: default_task_limit(),
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.todoist.com/api/v1").expect("valid default todoist api url")
}

fn default_task_query() -> String {
    "today | od".to_string()
}

fn default_task_limit() -> u32 {
    200
}
