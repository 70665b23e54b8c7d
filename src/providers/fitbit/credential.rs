use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use oauth2::TokenResponse;
use serde::{Deserialize, Serialize};

use crate::error::OauthError;
use crate::oauth_utils::OauthTokenResponse;

/// Lifetime assumed when the token endpoint omits `expires_in` (Fitbit issues 8 hour tokens).
const DEFAULT_TOKEN_LIFETIME: TimeDelta = TimeDelta::hours(8);

/// Delegated-access credential as persisted on disk.
///
/// Replaced wholesale on refresh, never patched field by field.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    #[serde(with = "expiry_format")]
    pub expiry: DateTime<Utc>,
}

impl Credential {
    /// Valid iff `now + skew < expiry`.
    pub fn is_valid(&self, now: DateTime<Utc>, skew: TimeDelta) -> bool {
        now + skew < self.expiry
    }

    /// Build a credential from a token endpoint response.
    ///
    /// `previous_refresh_token` is carried over when the response does not rotate it.
    pub(crate) fn from_token_response(
        token: &OauthTokenResponse,
        previous_refresh_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, OauthError> {
        let refresh_token = token
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| previous_refresh_token.map(str::to_string))
            .ok_or(OauthError::MissingRefreshToken)?;

        let lifetime = token
            .expires_in()
            .and_then(|d| TimeDelta::from_std(d).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        Ok(Self {
            access_token: token.access_token().secret().clone(),
            token_type: token.token_type().as_ref().to_string(),
            refresh_token,
            expiry: now + lifetime,
        })
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("refresh_token", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// RFC 3339 in UTC with a `Z` suffix; fractional seconds only when non-zero.
/// Reading accepts any RFC 3339 offset and normalises to UTC.
mod expiry_format {
    use super::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
