use backon::{ExponentialBuilder, Retryable};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier, RefreshToken, Scope};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::FitbitResolvedConfig;
use crate::error::{IsRetryable, OauthError};
use crate::oauth_utils::{OauthTokenResponse, fitbit_oauth2_client};

/// Stateless Fitbit OAuth endpoints built from resolved config.
///
/// A fresh oauth2 client is built per call so tests can point the config at mock servers.
pub struct FitbitOauthEndpoints;

impl FitbitOauthEndpoints {
    /// Authorization URL with the configured scopes and a PKCE S256 challenge.
    pub(crate) fn build_authorize_url(
        cfg: &FitbitResolvedConfig,
        pkce_challenge: PkceCodeChallenge,
    ) -> Result<(url::Url, CsrfToken), OauthError> {
        let client = fitbit_oauth2_client(cfg)?;
        let mut req = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge)
            .add_extra_param("access_type", "offline");

        for scope in &cfg.scopes {
            req = req.add_scope(Scope::new(scope.clone()));
        }

        Ok(req.url())
    }

    /// Exchange an authorization code (PKCE) for tokens.
    pub(crate) async fn exchange_authorization_code(
        cfg: &FitbitResolvedConfig,
        code: AuthorizationCode,
        verifier: PkceCodeVerifier,
        http_client: &reqwest::Client,
    ) -> Result<OauthTokenResponse, OauthError> {
        let client = fitbit_oauth2_client(cfg)?;
        let token: OauthTokenResponse = client
            .exchange_code(code)
            .set_pkce_verifier(verifier)
            .request_async(http_client)
            .await?;

        info!(
            user_id = token.extra_fields().user_id.as_deref().unwrap_or("<unknown>"),
            "Fitbit OAuth2 code exchange completed"
        );
        Ok(token)
    }

    /// Refresh an access token, retrying transport errors and transient statuses.
    pub(crate) async fn refresh_access_token(
        cfg: &FitbitResolvedConfig,
        refresh_token: &str,
        http_client: &reqwest::Client,
    ) -> Result<OauthTokenResponse, OauthError> {
        let client = fitbit_oauth2_client(cfg)?;
        let refresh_token = RefreshToken::new(refresh_token.to_string());

        (|| async {
            client
                .exchange_refresh_token(&refresh_token)
                .request_async(http_client)
                .await
                .map_err(OauthError::from)
        })
        .retry(
            ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(500))
                .with_max_delay(Duration::from_secs(3))
                .with_max_times(cfg.retry_max_times)
                .with_jitter(),
        )
        .when(|e: &OauthError| e.is_retryable())
        .notify(|err, dur: Duration| {
            warn!("fitbit token refresh retrying after error {err}, sleeping {dur:?}");
        })
        .await
    }
}
