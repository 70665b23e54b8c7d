use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use super::ProviderDefaults;

/// Fitbit provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FitbitConfig {
    /// Run the credential bootstrap and expose the fitness routes.
    /// TOML: `providers.fitbit.enabled`. Default: `true`.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// OAuth2 client id. TOML: `providers.fitbit.client_id`.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret (sent with HTTP Basic auth). TOML: `providers.fitbit.client_secret`.
    #[serde(default)]
    pub client_secret: String,

    /// Host the authorization server redirects back to. `localhost` maps to
    /// `http://localhost:{callback_port}`, anything else to `https://{redirect_host}`.
    /// TOML: `providers.fitbit.redirect_host`. Default: `localhost`.
    #[serde(default = "default_redirect_host")]
    pub redirect_host: String,

    /// Fixed port of the local authorization callback listener.
    /// TOML: `providers.fitbit.callback_port`. Default: `8001`.
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,

    /// Credential file location. TOML: `providers.fitbit.token_path`.
    /// Default: `./.fitbit_token/token.json`.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Web API base URL. TOML: `providers.fitbit.api_url`. Default: `https://api.fitbit.com`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// TOML: `providers.fitbit.auth_url`. Default: `https://www.fitbit.com/oauth2/authorize`.
    #[serde(default = "default_auth_url")]
    pub auth_url: Url,

    /// TOML: `providers.fitbit.token_url`. Default: `https://api.fitbit.com/oauth2/token`.
    #[serde(default = "default_token_url")]
    pub token_url: Url,

    /// Requested scopes. TOML: `providers.fitbit.scopes`.
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Seconds subtracted from the expiry before a token counts as valid.
    /// TOML: `providers.fitbit.expiry_skew_secs`. Default: `0`.
    #[serde(default)]
    pub expiry_skew_secs: u64,

    /// Give up waiting for the authorization callback after this many seconds.
    /// TOML: `providers.fitbit.authorization_timeout_secs`. Default: unset (wait forever).
    #[serde(default)]
    pub authorization_timeout_secs: Option<u64>,

    /// Optional upstream HTTP proxy.
    /// Falls back to `providers.defaults.proxy` when unset.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,

    /// Falls back to `providers.defaults.retry_max_times`.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct FitbitResolvedConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    /// Kept verbatim; the provider compares it byte-for-byte with the registered URI.
    pub redirect_url: String,
    pub callback_port: u16,
    pub token_path: PathBuf,
    pub api_url: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
    pub expiry_skew: chrono::Duration,
    pub authorization_timeout: Option<Duration>,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
    pub retry_max_times: usize,
}

impl FitbitConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> FitbitResolvedConfig {
        let client_secret = Some(self.client_secret.clone()).filter(|s| !s.trim().is_empty());
        let skew_secs = i64::try_from(self.expiry_skew_secs).unwrap_or(i64::MAX);

        FitbitResolvedConfig {
            client_id: self.client_id.clone(),
            client_secret,
            redirect_url: redirect_url(&self.redirect_host, self.callback_port),
            callback_port: self.callback_port,
            token_path: self.token_path.clone(),
            api_url: self.api_url.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
            scopes: self.scopes.clone(),
            expiry_skew: chrono::Duration::try_seconds(skew_secs).unwrap_or_default(),
            authorization_timeout: self.authorization_timeout_secs.map(Duration::from_secs),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

impl Default for FitbitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_host: default_redirect_host(),
            callback_port: default_callback_port(),
            token_path: default_token_path(),
            api_url: default_api_url(),
            auth_url: default_auth_url(),
            token_url: default_token_url(),
            scopes: default_scopes(),
            expiry_skew_secs: 0,
            authorization_timeout_secs: None,
            proxy: None,
            enable_multiplexing: None,
            retry_max_times: None,
        }
    }
}

fn redirect_url(host: &str, port: u16) -> String {
    let raw = if host == "localhost" {
        format!("http://localhost:{port}")
    } else {
        format!("https://{host}")
    };
    if let Err(e) = Url::parse(&raw) {
        panic!("invalid providers.fitbit.redirect_host {host:?}: {e}");
    }
    raw
}

fn default_enabled() -> bool {
    true
}

fn default_redirect_host() -> String {
    "localhost".to_string()
}

fn default_callback_port() -> u16 {
    8001
}

fn default_token_path() -> PathBuf {
    PathBuf::from("./.fitbit_token/token.json")
}

fn default_api_url() -> Url {
    Url::parse("https://api.fitbit.com").expect("valid default fitbit api url")
}

fn default_auth_url() -> Url {
    Url::parse("https://www.fitbit.com/oauth2/authorize").expect("valid default fitbit auth url")
}

fn default_token_url() -> Url {
    Url::parse("https://api.fitbit.com/oauth2/token").expect("valid default fitbit token url")
}

fn default_scopes() -> Vec<String> {
    ["activity", "profile", "sleep", "nutrition", "weight"]
        .into_iter()
        .map(str::to_string)
        .collect()
}
