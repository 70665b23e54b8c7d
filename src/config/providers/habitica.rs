use serde::{Deserialize, Serialize};
use url::Url;

use super::ProviderDefaults;

/// Habit tracker configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HabiticaConfig {
    /// TOML: `providers.habitica.api_url`. Default: `https://habitica.com/api/v3`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Sent as `x-api-user`. Required.
    #[serde(default)]
    pub api_user: String,

    /// Sent as `x-api-key`. Required.
    #[serde(default)]
    pub api_key: String,

    /// Suffix of the `x-client` header (`{api_user}-{client_suffix}`).
    /// TOML: `providers.habitica.client_suffix`. Default: `misc-webhooks`.
    #[serde(default = "default_client_suffix")]
    pub client_suffix: String,

    #[serde(default)]
    pub proxy: Option<Url>,

    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct HabiticaResolvedConfig {
    pub api_url: Url,
    pub api_user: String,
    pub api_key: String,
    pub client_id: String,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl HabiticaConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> HabiticaResolvedConfig {
        HabiticaResolvedConfig {
            api_url: self.api_url.clone(),
            api_user: self.api_user.clone(),
            api_key: self.api_key.clone(),
            client_id: format!("{}-{}", self.api_user, self.client_suffix),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for HabiticaConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_user: String::new(),
            api_key: String::new(),
            client_suffix: default_client_suffix(),
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://habitica.com/api/v3").expect("valid default habitica api url")
}

fn default_client_suffix() -> String {
    "misc-webhooks".to_string()
}
