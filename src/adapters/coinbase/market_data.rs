//! Market data gateway backed by the Coinbase v2 price endpoints.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::domain::errors::GatewayError;
use crate::domain::intent::Symbol;
use crate::ports::market_data::{AssetStatus, MarketData, MarketSnapshot};

use super::client::CoinbaseClient;
use super::types::{HistoricPricesResponse, SpotPriceResponse};

/// Read-only price lookups. Owns no state beyond the shared client.
pub struct CoinbaseMarketData {
    client: Arc<CoinbaseClient>,
    /// Assets included in the market-status overview.
    symbols: Vec<Symbol>,
}

impl CoinbaseMarketData {
    pub fn new(client: Arc<CoinbaseClient>, symbols: Vec<Symbol>) -> Self {
        Self { client, symbols }
    }

    /// 24h change in percent from the daily historic series.
    ///
    /// Best-effort: any failure yields `None` rather than failing the
    /// whole status lookup. The API returns points newest-first.
    async fn change_24h(&self, symbol: Symbol) -> Option<Decimal> {
        let path = format!("/v2/prices/{}/historic?period=day", symbol.product_id());
        let response: HistoricPricesResponse = self.client.get_public(&path).await.ok()?;
        let prices = &response.data.prices;
        let latest = Decimal::from_str(&prices.first()?.price).ok()?;
        let earliest = Decimal::from_str(&prices.last()?.price).ok()?;
        if earliest <= Decimal::ZERO {
            return None;
        }
        Some((latest - earliest) / earliest * Decimal::ONE_HUNDRED)
    }
}

#[async_trait]
impl MarketData for CoinbaseMarketData {
    #[instrument(skip(self), fields(symbol = %symbol))]
    async fn get_price(&self, symbol: Symbol) -> Result<Decimal, GatewayError> {
        let path = format!("/v2/prices/{}/spot", symbol.product_id());
        let response: SpotPriceResponse = self.client.get_public(&path).await?;
        let spot = Decimal::from_str(&response.data.amount).map_err(|e| {
            GatewayError::rejected(format!("unparseable spot price for {symbol}: {e}"))
        })?;
        debug!(%spot, "Fetched spot price");
        Ok(spot)
    }

    #[instrument(skip(self))]
    async fn get_market_status(&self) -> Result<MarketSnapshot, GatewayError> {
        let mut assets = Vec::with_capacity(self.symbols.len());
        for &symbol in &self.symbols {
            let spot_usd = self.get_price(symbol).await?;
            let change_24h_pct = self.change_24h(symbol).await;
            assets.push(AssetStatus {
                symbol,
                spot_usd,
                change_24h_pct,
            });
        }
        Ok(MarketSnapshot { assets })
    }
}
