//! Market data port - read-only price and market-status lookups.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::errors::GatewayError;
use crate::domain::intent::Symbol;

/// Spot price and 24h movement for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetStatus {
    pub symbol: Symbol,
    /// Current USD spot price.
    pub spot_usd: Decimal,
    /// 24-hour change in percent, when the history lookup succeeds.
    pub change_24h_pct: Option<Decimal>,
}

/// Market overview across the configured assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub assets: Vec<AssetStatus>,
}

/// Trait for market data providers. Leaf dependency: owns no state,
/// performs no retries.
#[async_trait]
pub trait MarketData: Send + Sync + 'static {
    /// Current USD spot price for a symbol.
    async fn get_price(&self, symbol: Symbol) -> Result<Decimal, GatewayError>;

    /// Spot prices plus 24h change for the supported assets.
    async fn get_market_status(&self) -> Result<MarketSnapshot, GatewayError>;
}
