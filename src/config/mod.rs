//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml`. Credentials are
//! NEVER in the file — they come from environment variables at startup
//! (COINBASE_API_KEY, COINBASE_API_SECRET, TOGETHER_API_KEY).
//!
//! Everything here is read-only after startup: the symbol allow-list,
//! order-size limits, and endpoint URLs are loaded once and shared by
//! reference into each component.

pub mod loader;

use rust_decimal::Decimal;
use serde::Deserialize;

/// Top-level bot configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the bot begins serving requests.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bot identity and metadata.
    pub bot: BotConfig,
    /// Trading rules: allow-list, limits, idempotency bucket.
    pub trading: TradingConfig,
    /// Language model endpoint and sampling parameters.
    pub llm: LlmConfig,
    /// Coinbase API endpoints.
    pub coinbase: CoinbaseConfig,
    /// HTTP front-end and observability.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Human-readable bot name.
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Trading rules configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    /// Symbols this deployment accepts ("BTC", "ETH", ...).
    pub allowed_symbols: Vec<String>,
    /// Symbols blocked for this account despite global support.
    #[serde(default)]
    pub restricted_symbols: Vec<String>,
    /// Minimum order size in base units.
    #[serde(default = "default_min_order_size")]
    pub min_order_size: Decimal,
    /// Per-trade ceiling applied to requested amounts.
    #[serde(default = "default_max_trade_usd")]
    pub max_trade_usd: Decimal,
    /// Idempotency time-bucket width in seconds.
    #[serde(default = "default_bucket_secs")]
    pub idempotency_bucket_secs: u64,
}

/// Language model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions base URL.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Model identifier.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Completion token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus sampling parameter.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Request timeout in milliseconds.
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

/// Coinbase API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinbaseConfig {
    /// API base URL (v2 and v3 paths hang off this).
    #[serde(default = "default_coinbase_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_coinbase_timeout_ms")]
    pub timeout_ms: u64,
}

/// HTTP front-end configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address for /query, /live, /ready, /metrics.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

// Default value functions for serde

fn default_log_level() -> String {
    "info".to_string()
}

fn default_min_order_size() -> Decimal {
    Decimal::new(1, 4) // 0.0001
}

fn default_max_trade_usd() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_bucket_secs() -> u64 {
    60
}

fn default_llm_base_url() -> String {
    "https://api.together.xyz".to_string()
}

fn default_llm_model() -> String {
    "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string()
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_llm_timeout_ms() -> u64 {
    30_000
}

fn default_coinbase_base_url() -> String {
    "https://api.coinbase.com".to_string()
}

fn default_coinbase_timeout_ms() -> u64 {
    10_000
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}
