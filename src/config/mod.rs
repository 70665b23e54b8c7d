mod basic;
mod providers;

pub use basic::BasicConfig;
pub use providers::{
    FitbitConfig, FitbitResolvedConfig, HabiticaConfig, HabiticaResolvedConfig, ProviderDefaults,
    ProvidersConfig, TodoistConfig, TodoistResolvedConfig,
};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Upstream service settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment prefix; nested keys use `__`, e.g. `PULSEDASH_PROVIDERS__HABITICA__API_KEY`.
const ENV_PREFIX: &str = "PULSEDASH_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and the environment.
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from every source and validates the upstream credentials that
    /// enabled integrations need.
    pub fn from_sources() -> Self {
        let cfg: Self = Self::figment()
            .extract()
            .unwrap_or_else(|err| panic!("failed to extract configuration: {err}"));

        if cfg.providers.habitica.api_user.trim().is_empty()
            || cfg.providers.habitica.api_key.trim().is_empty()
        {
            panic!("providers.habitica.api_user and providers.habitica.api_key must be set");
        }
        if cfg.providers.todoist.api_key.trim().is_empty() {
            panic!("providers.todoist.api_key must be set and non-empty");
        }
        if cfg.providers.fitbit.enabled && cfg.providers.fitbit.client_id.trim().is_empty() {
            panic!("providers.fitbit.client_id must be set when the fitbit integration is enabled");
        }
        cfg
    }

    pub fn fitbit(&self) -> FitbitResolvedConfig {
        self.providers.fitbit.resolve(&self.providers.defaults)
    }

    pub fn habitica(&self) -> HabiticaResolvedConfig {
        self.providers.habitica.resolve(&self.providers.defaults)
    }

    pub fn todoist(&self) -> TodoistResolvedConfig {
        self.providers.todoist.resolve(&self.providers.defaults)
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_sources);
