mod fitbit;
mod habitica;
mod todoist;

pub use fitbit::{FitbitConfig, FitbitResolvedConfig};
pub use habitica::{HabiticaConfig, HabiticaResolvedConfig};
pub use todoist::{TodoistConfig, TodoistResolvedConfig};

use serde::{Deserialize, Serialize};
use url::Url;

/// Global upstream defaults (used when provider-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Allow HTTP/2 multiplexing for reqwest clients; disabled forces HTTP/1.
    /// TOML: `providers.defaults.enable_multiplexing`. Default: `false`.
    #[serde(default = "default_enable_multiplexing")]
    pub enable_multiplexing: bool,

    /// Max retry attempts for idempotent upstream reads and token endpoint calls.
    /// Scoring calls are never retried.
    /// TOML: `providers.defaults.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            enable_multiplexing: default_enable_multiplexing(),
            retry_max_times: default_retry_max_times(),
        }
    }
}

/// All upstream configurations.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProvidersConfig {
    /// Global defaults for providers (overridden per provider if set).
    #[serde(default)]
    pub defaults: ProviderDefaults,

    /// Fitness tracker (OAuth2 delegated access).
    #[serde(default)]
    pub fitbit: FitbitConfig,

    /// Habit tracker (API key).
    #[serde(default)]
    pub habitica: HabiticaConfig,

    /// Task manager (API token).
    #[serde(default)]
    pub todoist: TodoistConfig,
}

fn default_enable_multiplexing() -> bool {
    false
}

fn default_retry_max_times() -> usize {
    2
}
