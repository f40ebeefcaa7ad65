//! Coinbase Authentication — HMAC-SHA256 Request Signing
//!
//! Signs authenticated Coinbase API requests with the CB-ACCESS scheme.
//! Credentials come from environment variables (COINBASE_API_KEY,
//! COINBASE_API_SECRET) and never leave this module except as a computed
//! signature.

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine;

/// Coinbase API authentication handler.
///
/// Holds the key and secret loaded once at startup. The secret is never
/// sent in a header and never logged.
pub struct CoinbaseAuth {
    /// API key from COINBASE_API_KEY env var.
    api_key: String,
    /// API secret from COINBASE_API_SECRET env var (never sent in headers).
    api_secret: String,
}

impl CoinbaseAuth {
    /// Load credentials from environment variables.
    ///
    /// Required env vars: COINBASE_API_KEY, COINBASE_API_SECRET.
    /// These MUST be set in `.env` (never committed to git).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COINBASE_API_KEY").context("COINBASE_API_KEY not set")?;
        let api_secret =
            std::env::var("COINBASE_API_SECRET").context("COINBASE_API_SECRET not set")?;
        Ok(Self::new(api_key, api_secret))
    }

    /// Construct directly (used by tests with fixture credentials).
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
        }
    }

    /// Get the API key for request headers.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Current Unix timestamp in seconds (for signing).
    pub fn timestamp() -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }

    /// Sign a request using HMAC-SHA256.
    ///
    /// Signature format: HMAC-SHA256(secret, timestamp + method + path + body)
    /// base64-encoded. The secret itself is never transmitted.
    pub fn sign(&self, timestamp: &str, method: &str, path: &str, body: &str) -> String {
        let message = format!("{timestamp}{method}{path}{body}");
        let mac = hmac_sha256::HMAC::mac(message.as_bytes(), self.api_secret.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac)
    }
}
