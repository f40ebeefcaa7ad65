//! Frank Bot — Entry Point
//!
//! Chat-driven trading assistant. Wires the language-model interpreter
//! and the Coinbase gateways into the trade execution pipeline and
//! serves it over HTTP. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Load Coinbase auth from env vars (COINBASE_API_KEY, COINBASE_API_SECRET)
//! 4. Create CoinbaseClient (HTTP + signing, no retries)
//! 5. Create the three Coinbase gateways (market data, account, orders)
//! 6. Create TogetherInterpreter (TOGETHER_API_KEY)
//! 7. Assemble TradePipeline + metrics
//! 8. Serve axum router → SIGINT → readiness flips → graceful drain

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::coinbase::auth::CoinbaseAuth;
use adapters::coinbase::client::{CoinbaseClient, CoinbaseClientConfig};
use adapters::coinbase::{CoinbaseAccountGateway, CoinbaseMarketData, CoinbaseOrderGateway};
use adapters::http::{router, AppState};
use adapters::llm::TogetherInterpreter;
use adapters::metrics::MetricsRegistry;
use usecases::TradePipeline;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config =
        config::loader::load_config("config.toml").context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        "Starting trading assistant"
    );

    // ── 3. Coinbase auth from env vars ──────────────────────
    let auth = Arc::new(
        CoinbaseAuth::from_env().context("Failed to load Coinbase credentials from env")?,
    );

    // ── 4. Shared Coinbase HTTP client ──────────────────────
    let coinbase_config = CoinbaseClientConfig {
        base_url: config.coinbase.base_url.clone(),
        timeout: Duration::from_millis(config.coinbase.timeout_ms),
    };
    let coinbase = Arc::new(
        CoinbaseClient::new(Arc::clone(&auth), coinbase_config)
            .context("Failed to create Coinbase client")?,
    );

    // ── 5. Gateways behind the ports ────────────────────────
    let rules = config::loader::trading_rules(&config)?;
    let market = Arc::new(CoinbaseMarketData::new(
        Arc::clone(&coinbase),
        rules.allowed.clone(),
    ));
    let account = Arc::new(CoinbaseAccountGateway::new(Arc::clone(&coinbase)));
    let orders = Arc::new(CoinbaseOrderGateway::new(Arc::clone(&coinbase)));

    // ── 6. Language-model interpreter ───────────────────────
    let interpreter = Arc::new(
        TogetherInterpreter::from_env(config.llm.clone())
            .context("Failed to create language model interpreter")?,
    );

    // ── 7. Pipeline + metrics + shared state ────────────────
    let pipeline = Arc::new(TradePipeline::new(
        interpreter,
        market,
        account,
        orders,
        rules,
    ));
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let (ready_tx, ready_rx) = watch::channel(true);
    let state = Arc::new(AppState {
        pipeline,
        metrics,
        ready: ready_rx,
    });

    // ── 8. Serve until SIGINT, then drain in-flight requests ─
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    info!(address = %config.server.bind_address, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = signal::ctrl_c().await;
            info!("SIGINT received, initiating graceful shutdown");
            // Readiness flips first so load balancers stop routing here
            // while in-flight brokerage calls complete.
            let _ = ready_tx.send(false);
        })
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}
