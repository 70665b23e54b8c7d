use crate::config::FitbitResolvedConfig;
use crate::error::OauthError;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::{
    AuthUrl, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet, ExtraTokenFields,
    RedirectUrl, StandardRevocableToken, StandardTokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

/// Fitbit returns the owning account next to the standard token fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(crate) struct FitbitTokenFields {
    #[serde(default)]
    pub user_id: Option<String>,
}

impl ExtraTokenFields for FitbitTokenFields {}

pub(crate) type OauthTokenResponse = StandardTokenResponse<FitbitTokenFields, BasicTokenType>;

/// Client with authorization and token endpoints set; the other endpoints are unused.
pub(crate) type FitbitOauth2Client = Client<
    BasicErrorResponse,
    OauthTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

fn invalid(what: &str, e: impl std::fmt::Display) -> OauthError {
    OauthError::Other {
        message: format!("invalid {what}: {e}"),
    }
}

/// Client for the `authorization_code` and `refresh_token` grants.
///
/// A configured client secret goes out as HTTP Basic auth, oauth2's default.
pub(crate) fn fitbit_oauth2_client(
    cfg: &FitbitResolvedConfig,
) -> Result<FitbitOauth2Client, OauthError> {
    let auth_url = AuthUrl::new(cfg.auth_url.to_string()).map_err(|e| invalid("auth url", e))?;
    let token_url =
        TokenUrl::new(cfg.token_url.to_string()).map_err(|e| invalid("token url", e))?;
    let redirect =
        RedirectUrl::new(cfg.redirect_url.clone()).map_err(|e| invalid("redirect url", e))?;

    let client = Client::<
        BasicErrorResponse,
        OauthTokenResponse,
        BasicTokenIntrospectionResponse,
        StandardRevocableToken,
        BasicRevocationErrorResponse,
    >::new(ClientId::new(cfg.client_id.clone()))
    .set_auth_uri(auth_url)
    .set_token_uri(token_url)
    .set_redirect_uri(redirect);

    Ok(match cfg.client_secret.as_deref() {
        Some(secret) => client.set_client_secret(ClientSecret::new(secret.to_string())),
        None => client,
    })
}
