//! Coinbase wire types.
//!
//! Request/response structs for the v2 data endpoints and the v3 brokerage
//! order endpoint. Amounts are strings on the wire, parsed to `Decimal` at
//! the adapter boundary.

use serde::{Deserialize, Serialize};

// ── v2 data endpoints ───────────────────────────────────────

/// `GET /v2/prices/{product}/spot`
#[derive(Debug, Clone, Deserialize)]
pub struct SpotPriceResponse {
    pub data: SpotPrice,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotPrice {
    /// USD amount as a decimal string.
    pub amount: String,
}

/// `GET /v2/prices/{product}/historic?period=day`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoricPricesResponse {
    pub data: HistoricPrices,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoricPrices {
    /// Price points, newest first.
    pub prices: Vec<PricePoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricePoint {
    pub price: String,
}

/// `GET /v2/accounts`
#[derive(Debug, Clone, Deserialize)]
pub struct AccountsResponse {
    pub data: Vec<AccountResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResource {
    /// Currency code ("USD", "BTC", ...).
    pub currency: String,
    pub balance: AccountBalance,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    /// Amount as a decimal string.
    pub amount: String,
}

// ── v3 brokerage order endpoint ─────────────────────────────

/// `POST /api/v3/brokerage/orders` request body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Idempotency key; the brokerage collapses repeated submissions.
    pub client_order_id: String,
    /// Product pair, e.g. "BTC-USD".
    pub product_id: String,
    /// "BUY" or "SELL".
    pub side: String,
    pub order_configuration: OrderConfiguration,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderConfiguration {
    pub market_market_ioc: MarketIoc,
}

/// Market immediate-or-cancel order.
///
/// Buys are sized in quote currency (USD, 2 decimal places), sells in base
/// units — exactly one of the two fields is set.
#[derive(Debug, Clone, Serialize)]
pub struct MarketIoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_size: Option<String>,
}

/// `POST /api/v3/brokerage/orders` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub success_response: Option<OrderSuccess>,
    #[serde(default)]
    pub error_response: Option<OrderError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderSuccess {
    pub order_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderError {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
    #[serde(default)]
    pub preview_failure_reason: Option<String>,
}

impl OrderError {
    /// Best human-readable reason the brokerage gave us.
    pub fn reason(&self) -> String {
        [
            self.message.as_deref(),
            self.error_details.as_deref(),
            self.preview_failure_reason.as_deref(),
            self.error.as_deref(),
        ]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or("order rejected by brokerage")
        .to_string()
    }
}
