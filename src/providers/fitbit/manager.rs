use chrono::{DateTime, TimeDelta, Utc};
use oauth2::PkceCodeChallenge;
use serde::de::DeserializeOwned;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::{error, info, warn};
use url::Url;

use super::callback::CallbackListener;
use super::endpoints::FitbitOauthEndpoints;
use super::{Credential, SERVICE, TokenStore};
use crate::config::FitbitResolvedConfig;
use crate::error::DashError;
use crate::providers::upstream::get_json_with_retry;

/// Where a freshly loaded credential puts the manager.
#[derive(Debug)]
pub enum CredentialState {
    Ready(Credential),
    Expired(Credential),
    AwaitingAuthorization,
}

/// Classify the result of the startup load.
pub fn initial_state(
    loaded: Result<Credential, DashError>,
    now: DateTime<Utc>,
    skew: TimeDelta,
) -> CredentialState {
    match loaded {
        Ok(credential) if credential.is_valid(now, skew) => CredentialState::Ready(credential),
        Ok(credential) => CredentialState::Expired(credential),
        Err(e) => {
            info!("no usable stored credential ({e}); authorization required");
            CredentialState::AwaitingAuthorization
        }
    }
}

/// Owns the fitness credential and hands out authenticated requests.
///
/// The credential mutex is held across a refresh, so concurrent callers that find the token
/// expired wait for one refresh and reuse its result.
pub struct CredentialManager {
    cfg: Arc<FitbitResolvedConfig>,
    store: Arc<dyn TokenStore>,
    http: reqwest::Client,
    credential: Mutex<Credential>,
    fatal: Arc<Notify>,
}

impl CredentialManager {
    /// Load, refresh or interactively obtain a credential. The authorization URL is printed.
    pub async fn bootstrap(
        cfg: Arc<FitbitResolvedConfig>,
        store: Arc<dyn TokenStore>,
        http: reqwest::Client,
    ) -> Result<Arc<Self>, DashError> {
        Self::bootstrap_with_prompt(cfg, store, http, |url| {
            println!("visit url for auth: {url}");
        })
        .await
    }

    /// Same as [`Self::bootstrap`] with a custom way of showing the authorization URL.
    pub async fn bootstrap_with_prompt<P>(
        cfg: Arc<FitbitResolvedConfig>,
        store: Arc<dyn TokenStore>,
        http: reqwest::Client,
        prompt: P,
    ) -> Result<Arc<Self>, DashError>
    where
        P: FnOnce(&Url) + Send,
    {
        let loaded = store.load().await;
        let credential = match initial_state(loaded, Utc::now(), cfg.expiry_skew) {
            CredentialState::Ready(credential) => {
                info!(expiry = %credential.expiry, "stored fitbit credential is valid");
                credential
            }
            CredentialState::Expired(stale) => {
                info!(expiry = %stale.expiry, "stored fitbit credential expired; refreshing");
                let fresh = refresh(&cfg, &http, &stale).await?;
                store.save(&fresh).await?;
                fresh
            }
            CredentialState::AwaitingAuthorization => {
                let fresh = authorize(&cfg, &http, prompt).await?;
                store.save(&fresh).await?;
                fresh
            }
        };

        Ok(Arc::new(Self {
            cfg,
            store,
            http,
            credential: Mutex::new(credential),
            fatal: Arc::new(Notify::new()),
        }))
    }

    /// Notified once when a refresh fails at call time; the server shuts down on it.
    pub fn fatal_signal(&self) -> Arc<Notify> {
        self.fatal.clone()
    }

    pub fn config(&self) -> &FitbitResolvedConfig {
        &self.cfg
    }

    /// Current bearer token, refreshed first when it is no longer valid.
    pub async fn access_token(&self) -> Result<String, DashError> {
        let mut current = self.credential.lock().await;
        if current.is_valid(Utc::now(), self.cfg.expiry_skew) {
            return Ok(current.access_token.clone());
        }

        info!(expiry = %current.expiry, "fitbit access token expired; refreshing");
        let refreshed = match refresh(&self.cfg, &self.http, &current).await {
            Ok(fresh) => self.store.save(&fresh).await.map(|()| fresh),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(fresh) => {
                let token = fresh.access_token.clone();
                *current = fresh;
                Ok(token)
            }
            Err(e) => {
                error!("fitbit credential refresh failed, shutting down: {e}");
                self.fatal.notify_one();
                Err(e)
            }
        }
    }

    /// Authenticated JSON GET. `prepare` adds per-endpoint headers or query parameters.
    pub async fn get_json<T, F>(&self, url: &Url, prepare: F) -> Result<T, DashError>
    where
        T: DeserializeOwned,
        F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    {
        let token = self.access_token().await?;
        get_json_with_retry(SERVICE, &self.http, url, self.cfg.retry_max_times, |req| {
            prepare(req.bearer_auth(&token))
        })
        .await
    }
}

async fn refresh(
    cfg: &FitbitResolvedConfig,
    http: &reqwest::Client,
    stale: &Credential,
) -> Result<Credential, DashError> {
    let token = FitbitOauthEndpoints::refresh_access_token(cfg, &stale.refresh_token, http).await?;
    Ok(Credential::from_token_response(
        &token,
        Some(&stale.refresh_token),
        Utc::now(),
    )?)
}

async fn authorize<P>(
    cfg: &FitbitResolvedConfig,
    http: &reqwest::Client,
    prompt: P,
) -> Result<Credential, DashError>
where
    P: FnOnce(&Url) + Send,
{
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    let (auth_url, csrf) = FitbitOauthEndpoints::build_authorize_url(cfg, challenge)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, cfg.callback_port));
    let listener = CallbackListener::bind(addr, csrf.secret()).await?;
    prompt(&auth_url);

    let code = listener.wait(cfg.authorization_timeout).await.inspect_err(|e| {
        warn!("fitbit authorization did not complete: {e}");
    })?;

    let token =
        FitbitOauthEndpoints::exchange_authorization_code(cfg, code, verifier, http).await?;
    let credential = Credential::from_token_response(&token, None, Utc::now())?;
    Ok(credential)
}
