//! Order gateway backed by the Coinbase v3 brokerage order endpoint.
//!
//! Submits market immediate-or-cancel orders with the attempt's
//! idempotency key as `client_order_id`, so a repeated submission of the
//! same logical request returns the original result instead of executing
//! twice. No retries here — the gateway is a thin, stateless wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::domain::decision::OrderAttempt;
use crate::domain::errors::GatewayError;
use crate::domain::intent::TradeSide;
use crate::ports::orders::{OrderFill, OrderGateway};

use super::client::CoinbaseClient;
use super::types::{MarketIoc, OrderConfiguration, OrderRequest, OrderResponse};

const ORDERS_PATH: &str = "/api/v3/brokerage/orders";

/// Order submission adapter.
pub struct CoinbaseOrderGateway {
    client: Arc<CoinbaseClient>,
}

impl CoinbaseOrderGateway {
    pub fn new(client: Arc<CoinbaseClient>) -> Self {
        Self { client }
    }
}

/// Build the wire request for an approved attempt.
///
/// Buys are sized in quote currency (USD, two decimal places), sells in
/// base units with trailing zeros trimmed — the brokerage's expected
/// formats for market IOC orders.
fn order_request(attempt: &OrderAttempt) -> OrderRequest {
    let market_market_ioc = match attempt.side {
        TradeSide::Buy => MarketIoc {
            quote_size: Some(format!("{:.2}", attempt.notional_usd)),
            base_size: None,
        },
        TradeSide::Sell => MarketIoc {
            quote_size: None,
            base_size: Some(attempt.base_amount.round_dp(8).normalize().to_string()),
        },
    };

    OrderRequest {
        client_order_id: attempt.idempotency_key.clone(),
        product_id: attempt.symbol.product_id(),
        side: attempt.side.to_string(),
        order_configuration: OrderConfiguration { market_market_ioc },
    }
}

#[async_trait]
impl OrderGateway for CoinbaseOrderGateway {
    #[instrument(
        skip(self, attempt),
        fields(
            symbol = %attempt.symbol,
            side = %attempt.side,
            key = %attempt.idempotency_key,
            attempt = attempt.attempt,
        )
    )]
    async fn submit_order(&self, attempt: &OrderAttempt) -> Result<OrderFill, GatewayError> {
        let request = order_request(attempt);
        let body = serde_json::to_string(&request)
            .map_err(|e| GatewayError::rejected(format!("unserializable order: {e}")))?;

        let response: OrderResponse = self.client.post_signed(ORDERS_PATH, body).await?;

        if response.success {
            let order_id = response
                .success_response
                .map(|s| s.order_id)
                .ok_or_else(|| GatewayError::rejected("fill confirmation missing order_id"))?;
            info!(%order_id, "Order filled");
            // Market IOC fills at the decision-time notional; the effective
            // per-unit price is notional over base amount.
            let executed_price = if attempt.base_amount > Decimal::ZERO {
                attempt.notional_usd / attempt.base_amount
            } else {
                Decimal::ZERO
            };
            Ok(OrderFill {
                order_id,
                executed_amount: attempt.base_amount,
                executed_price,
            })
        } else {
            let reason = response.error_response.unwrap_or_default().reason();
            warn!(%reason, "Order rejected by brokerage");
            Err(GatewayError::rejected(reason))
        }
    }
}
