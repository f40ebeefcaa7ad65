//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::intent::Symbol;
use crate::domain::normalizer::TradingRules;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
    let path = Path::new(path);

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: AppConfig =
        toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

    validate_config(&config)?;

    info!(
        name = %config.bot.name,
        symbols = config.trading.allowed_symbols.len(),
        model = %config.llm.model,
        "Configuration loaded successfully"
    );

    Ok(config)
}

/// Build the immutable trading rules from validated config.
pub fn trading_rules(config: &AppConfig) -> Result<TradingRules> {
    let resolve_all = |raw: &[String]| -> Result<Vec<Symbol>> {
        raw.iter()
            .map(|s| {
                Symbol::resolve(s).with_context(|| format!("Unsupported symbol in config: {s}"))
            })
            .collect()
    };

    Ok(TradingRules {
        allowed: resolve_all(&config.trading.allowed_symbols)?,
        restricted: resolve_all(&config.trading.restricted_symbols)?,
        min_order_size: config.trading.min_order_size,
        max_trade_usd: config.trading.max_trade_usd,
        idempotency_bucket_secs: config.trading.idempotency_bucket_secs,
    })
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
    // Trading validation
    anyhow::ensure!(
        !config.trading.allowed_symbols.is_empty(),
        "At least one allowed symbol must be configured"
    );
    for symbol in &config.trading.allowed_symbols {
        anyhow::ensure!(
            Symbol::resolve(symbol).is_some(),
            "allowed_symbols entry {symbol:?} is not a supported asset"
        );
    }
    for symbol in &config.trading.restricted_symbols {
        anyhow::ensure!(
            Symbol::resolve(symbol).is_some(),
            "restricted_symbols entry {symbol:?} is not a supported asset"
        );
    }
    anyhow::ensure!(
        config.trading.min_order_size > Decimal::ZERO,
        "min_order_size must be positive, got {}",
        config.trading.min_order_size
    );
    anyhow::ensure!(
        config.trading.max_trade_usd > Decimal::ZERO,
        "max_trade_usd must be positive, got {}",
        config.trading.max_trade_usd
    );
    anyhow::ensure!(
        config.trading.idempotency_bucket_secs > 0,
        "idempotency_bucket_secs must be positive"
    );

    // LLM validation
    anyhow::ensure!(!config.llm.base_url.is_empty(), "LLM base_url must not be empty");
    anyhow::ensure!(!config.llm.model.is_empty(), "LLM model must not be empty");
    anyhow::ensure!(config.llm.max_tokens > 0, "LLM max_tokens must be positive");
    anyhow::ensure!(
        (0.0..=2.0).contains(&config.llm.temperature),
        "LLM temperature must be in [0, 2], got {}",
        config.llm.temperature
    );
    anyhow::ensure!(
        config.llm.top_p > 0.0 && config.llm.top_p <= 1.0,
        "LLM top_p must be in (0, 1], got {}",
        config.llm.top_p
    );
    anyhow::ensure!(config.llm.timeout_ms > 0, "LLM timeout_ms must be positive");

    // Coinbase validation
    anyhow::ensure!(
        !config.coinbase.base_url.is_empty(),
        "Coinbase base_url must not be empty"
    );
    anyhow::ensure!(
        config.coinbase.timeout_ms > 0,
        "Coinbase timeout_ms must be positive"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [bot]
        name = "frank"

        [trading]
        allowed_symbols = ["BTC", "ETH"]

        [llm]

        [coinbase]
    "#;

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        validate_config(&config).unwrap();
        assert_eq!(config.bot.log_level, "info");
        assert_eq!(config.trading.idempotency_bucket_secs, 60);
        assert_eq!(config.coinbase.base_url, "https://api.coinbase.com");
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
    }

    #[test]
    fn unknown_symbol_in_allow_list_fails_validation() {
        let raw = MINIMAL.replace("\"BTC\", \"ETH\"", "\"BTC\", \"SHIB\"");
        let config: AppConfig = toml::from_str(&raw).unwrap();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rules_are_built_from_config() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        let rules = trading_rules(&config).unwrap();
        assert_eq!(rules.allowed, vec![Symbol::BTC, Symbol::ETH]);
        assert!(rules.restricted.is_empty());
    }
}
