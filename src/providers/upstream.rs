use backon::{ExponentialBuilder, Retryable};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{DashError, IsRetryable};

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

pub const DASH_USER_AGENT: &str = concat!("pulsedash/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client honouring the per-service proxy and multiplexing settings.
pub fn build_client(
    user_agent: &str,
    proxy: Option<&Url>,
    enable_multiplexing: bool,
) -> Result<reqwest::Client, DashError> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30));

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    Ok(builder.default_headers(headers).build()?)
}

/// Retry policy for idempotent reads; `max_times` comes from the resolved service config.
pub fn read_retry_policy(max_times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_millis(300))
        .with_max_times(max_times)
        .with_jitter()
}

/// Turn a non-success response into [`DashError::UpstreamStatus`], logging a body preview.
pub async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, DashError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().clone();
    let body_preview = match resp.bytes().await {
        Ok(bytes) => {
            let raw_body = String::from_utf8_lossy(&bytes);
            format!("{:.len$}", raw_body, len = UPSTREAM_BODY_PREVIEW_CHARS)
        }
        Err(e) => format!("<failed to read body: {e}>"),
    };
    debug!(
        service,
        %status,
        url = %url,
        body = %body_preview,
        "[{service}] upstream answered with an error status"
    );
    Err(DashError::UpstreamStatus { service, status })
}

/// GET a JSON document, retrying transport errors and transient statuses.
///
/// `prepare` attaches service-specific headers and query parameters to each attempt.
pub async fn get_json_with_retry<T, F>(
    service: &'static str,
    client: &reqwest::Client,
    url: &Url,
    retry_max_times: usize,
    prepare: F,
) -> Result<T, DashError>
where
    T: DeserializeOwned,
    F: Fn(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
{
    (|| async {
        let resp = prepare(client.get(url.clone())).send().await?;
        let resp = ensure_success(service, resp).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice::<T>(&bytes)?)
    })
    .retry(read_retry_policy(retry_max_times))
    .when(|e: &DashError| e.is_retryable())
    .notify(|err, dur: Duration| {
        warn!(service, "[{service}] GET {url} retrying after error {err}, sleeping {dur:?}");
    })
    .await
}
