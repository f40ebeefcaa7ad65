//! Coinbase HTTP Client - Shared Authenticated REST Client
//!
//! Wraps reqwest with request signing, timeouts, and failure
//! classification for all Coinbase API interactions. Deliberately does NOT
//! retry: the pipeline owns all failure policy, and blind resubmission of
//! a trade without confirmed non-execution is unsafe.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::errors::GatewayError;

use super::auth::CoinbaseAuth;

/// Configuration for the Coinbase HTTP client.
#[derive(Debug, Clone)]
pub struct CoinbaseClientConfig {
    /// Base URL for the Coinbase API.
    pub base_url: String,
    /// Request timeout; a hang becomes a retryable `Unavailable`.
    pub timeout: Duration,
}

impl Default for CoinbaseClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coinbase.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Shared HTTP client for the Coinbase API.
pub struct CoinbaseClient {
    /// Underlying HTTP client.
    http: Client,
    /// Authentication manager.
    auth: Arc<CoinbaseAuth>,
    /// Client configuration.
    config: CoinbaseClientConfig,
}

impl CoinbaseClient {
    /// Create a new Coinbase client.
    pub fn new(auth: Arc<CoinbaseAuth>, config: CoinbaseClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, auth, config })
    }

    /// GET a public (unauthenticated) endpoint and deserialize the body.
    pub async fn get_public<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(classify_transport)?;
        deserialize(check_status(response).await?).await
    }

    /// GET a signed endpoint and deserialize the body.
    pub async fn get_signed<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self.signed(self.http.get(&url), "GET", path, "");
        let response = request.send().await.map_err(classify_transport)?;
        deserialize(check_status(response).await?).await
    }

    /// POST a signed endpoint with a JSON body and deserialize the reply.
    pub async fn post_signed<T: DeserializeOwned>(
        &self,
        path: &str,
        body: String,
    ) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self
            .signed(self.http.post(&url), "POST", path, &body)
            .header("Content-Type", "application/json")
            .body(body);
        let response = request.send().await.map_err(classify_transport)?;
        deserialize(check_status(response).await?).await
    }

    /// Attach CB-ACCESS auth headers.
    fn signed(
        &self,
        request: RequestBuilder,
        method: &str,
        path: &str,
        body: &str,
    ) -> RequestBuilder {
        let timestamp = CoinbaseAuth::timestamp();
        let signature = self.auth.sign(&timestamp, method, path, body);
        request
            .header("CB-ACCESS-KEY", self.auth.api_key())
            .header("CB-ACCESS-SIGN", signature)
            .header("CB-ACCESS-TIMESTAMP", timestamp)
    }
}

/// Map a transport-level failure to a gateway error.
///
/// Timeouts and connection failures are retryable: nothing reached the
/// brokerage, so a repeat request is safe.
fn classify_transport(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::unavailable(format!("request timed out: {error}"))
    } else {
        GatewayError::unavailable(format!("request failed: {error}"))
    }
}

/// Map a non-success HTTP status to a gateway error.
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %body, "Coinbase API error response");

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GatewayError::unauthorized(format!("credentials rejected ({status})"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            warn!("Rate limited by Coinbase API");
            GatewayError::rate_limited("throttled by Coinbase")
        }
        s if s.is_server_error() => GatewayError::unavailable(format!("server error {status}")),
        _ => GatewayError::rejected(format!("API error {status}: {body}")),
    })
}

/// Deserialize a success body; an unexpected shape is a non-retryable fault.
async fn deserialize<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::rejected(format!("unexpected response shape: {e}")))
}
