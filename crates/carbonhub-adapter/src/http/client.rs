/*
[INPUT]:  HTTP configuration (API host, timeouts)
[OUTPUT]: Configured reqwest client and envelope-aware send helpers
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::http::{CarbonHubError, Result};
use crate::types::{ApiEnvelope, ApiOutcome, ApiStatus};

/// Default API host when no configuration overrides it
pub const DEFAULT_API_HOST: &str = "http://localhost:8080";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_host: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_api_host(api_host: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for the CarbonHub authentication, swap and emission services
#[derive(Debug, Clone)]
pub struct CarbonHubClient {
    http_client: Client,
    base_url: Url,
}

impl CarbonHubClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: parse_base_url(&config.api_host)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL; endpoints are resolved under the base path
    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Build request builder for public endpoints
    pub(crate) fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        debug!(%method, %url, "building request");
        Ok(self.http_client.request(method, url))
    }

    /// Build request builder carrying `Authorization: Bearer <token>`
    pub(crate) fn bearer_request(
        &self,
        method: Method,
        endpoint: &str,
        token: &str,
    ) -> Result<RequestBuilder> {
        if token.trim().is_empty() {
            return Err(CarbonHubError::NotAuthenticated);
        }
        Ok(self.request(method, endpoint)?.bearer_auth(token))
    }

    /// Send a request and parse the `{status, message, data}` envelope.
    ///
    /// Error envelopes on non-2xx responses are returned as `ApiOutcome::Err`
    /// so the service message reaches the caller. Non-2xx responses without an
    /// envelope become `CarbonHubError::Api`.
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiOutcome<T>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope = match serde_json::from_str::<ApiEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(CarbonHubError::api_error(status, reason(status)));
            }
            Err(err) => {
                return Err(CarbonHubError::InvalidResponse(format!(
                    "malformed response body: {err}"
                )));
            }
        };

        if !status.is_success() && envelope.status == ApiStatus::Success {
            return Err(CarbonHubError::api_error(status, reason(status)));
        }

        envelope.into_outcome().map_err(|err| {
            CarbonHubError::InvalidResponse(format!("unexpected response data: {err}"))
        })
    }
}

fn reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn parse_base_url(api_host: &str) -> Result<Url> {
    let api_host = api_host.trim();
    if api_host.is_empty() {
        return Err(CarbonHubError::Config("api host must not be empty".to_string()));
    }

    let mut url = Url::parse(api_host)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
