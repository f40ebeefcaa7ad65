//! Coinbase brokerage adapters.
//!
//! One shared authenticated HTTP client feeds three thin gateways:
//! market data (public v2 prices), account (signed v2 accounts), and
//! orders (signed v3 brokerage). Failure classification lives in the
//! client; policy lives upstream in the pipeline.

pub mod account;
pub mod auth;
pub mod client;
pub mod market_data;
pub mod orders;
pub mod types;

pub use account::CoinbaseAccountGateway;
pub use auth::CoinbaseAuth;
pub use client::{CoinbaseClient, CoinbaseClientConfig};
pub use market_data::CoinbaseMarketData;
pub use orders::CoinbaseOrderGateway;
