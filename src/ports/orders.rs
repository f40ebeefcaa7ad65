//! Order port - the single submit operation against the brokerage.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::decision::OrderAttempt;
use crate::domain::errors::GatewayError;

/// Confirmed fill returned by the brokerage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFill {
    /// Brokerage-assigned order identifier.
    pub order_id: String,
    /// Base units executed.
    pub executed_amount: Decimal,
    /// Effective USD price per unit.
    pub executed_price: Decimal,
}

/// Trait for order submission providers.
///
/// Implementors pass the attempt's idempotency key to the brokerage with
/// every submission; the brokerage treats a repeated key as a no-op that
/// returns the original result. The gateway owns no state and never
/// retries — duplicate-submission safety lives entirely in that key.
#[async_trait]
pub trait OrderGateway: Send + Sync + 'static {
    /// Submit one market order. Called exactly once per attempt.
    ///
    /// # Errors
    /// `Rejected` (non-retryable) when the brokerage explicitly refuses the
    /// order; `Unavailable`/`RateLimited` (retryable) on transport trouble.
    async fn submit_order(&self, attempt: &OrderAttempt) -> Result<OrderFill, GatewayError>;
}
