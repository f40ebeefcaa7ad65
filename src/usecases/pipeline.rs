//! Trade Execution Pipeline — the core state machine.
//!
//! One invocation per incoming message:
//! `Received → Normalized → Checked → Submitted → Reconciled | Rejected | Failed`.
//!
//! The pipeline owns ALL failure policy. Gateways classify, the pipeline
//! decides: read-only lookups surface transient failures as retryable;
//! an order is submitted at most once per invocation, protected by the
//! deterministic idempotency key; a retryable submit failure is reported,
//! never auto-retried, because resubmitting a trade without positive
//! confirmation of non-execution is unsafe.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::domain::commands::parse_command;
use crate::domain::decision::{
    self, evaluate, ExecutionResult, OrderAttempt, Verdict,
};
use crate::domain::errors::{AdapterError, GatewayError, NormalizationError};
use crate::domain::intent::{NormalizedIntent, RawUtterance, Symbol, TradeRequest};
use crate::domain::normalizer::{normalize, TradingRules};
use crate::ports::account::AccountGateway;
use crate::ports::interpreter::IntentInterpreter;
use crate::ports::market_data::{MarketData, MarketSnapshot};
use crate::ports::orders::OrderGateway;

/// One valued position in the portfolio view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioPosition {
    pub symbol: Symbol,
    pub quantity: Decimal,
    /// USD value at current spot, when a price was available.
    pub value_usd: Option<Decimal>,
}

/// Portfolio reply: holdings, cash, and a total when fully priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioView {
    pub positions: Vec<PortfolioPosition>,
    pub cash_usd: Decimal,
    pub total_usd: Option<Decimal>,
}

/// Successful result of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Price { symbol: Symbol, usd: Decimal },
    Portfolio(PortfolioView),
    Market(MarketSnapshot),
    Trade(ExecutionResult),
}

/// Failure of one pipeline invocation, by origin.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// The pipeline with its four ports and the read-only trading rules.
///
/// Shared immutably across concurrent invocations; per-user requests are
/// NOT serialized — the idempotency key, not a lock, is the safeguard
/// against duplicate submission.
pub struct TradePipeline {
    interpreter: Arc<dyn IntentInterpreter>,
    market: Arc<dyn MarketData>,
    account: Arc<dyn AccountGateway>,
    orders: Arc<dyn OrderGateway>,
    rules: TradingRules,
}

impl TradePipeline {
    pub fn new(
        interpreter: Arc<dyn IntentInterpreter>,
        market: Arc<dyn MarketData>,
        account: Arc<dyn AccountGateway>,
        orders: Arc<dyn OrderGateway>,
        rules: TradingRules,
    ) -> Self {
        Self {
            interpreter,
            market,
            account,
            orders,
            rules,
        }
    }

    /// Handle one raw message end to end.
    ///
    /// `!`-prefixed messages take the command fast-path straight to the
    /// normalizer; everything else goes through the language model first.
    /// Both paths produce identical validation behavior for the same
    /// logical request.
    #[instrument(skip(self, text), fields(user = %user_id))]
    pub async fn handle(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let candidate = match parse_command(text) {
            Some(candidate) => {
                debug!("Command fast-path, language model bypassed");
                candidate
            }
            None => {
                let utterance = RawUtterance {
                    user_id: user_id.to_string(),
                    text: text.to_string(),
                };
                self.interpreter.interpret(&utterance).await?
            }
        };

        if let Some(confidence) = candidate.confidence {
            debug!(confidence, "Model-reported confidence");
        }

        let intent = normalize(&candidate, &self.rules)?;
        info!(kind = intent.kind(), "Intent normalized");

        match intent {
            NormalizedIntent::PriceQuery { symbol } => {
                let usd = self.market.get_price(symbol).await?;
                Ok(PipelineOutcome::Price { symbol, usd })
            }
            NormalizedIntent::PortfolioQuery => {
                Ok(PipelineOutcome::Portfolio(self.portfolio_view().await?))
            }
            NormalizedIntent::MarketStatusQuery => {
                Ok(PipelineOutcome::Market(self.market.get_market_status().await?))
            }
            NormalizedIntent::Trade(request) => self.execute_trade(user_id, request).await,
        }
    }

    /// Balances plus a best-effort valuation at current spot.
    ///
    /// The account gateway is called exactly once; pricing comes from a
    /// single market-status lookup and degrades to unvalued positions if
    /// it fails.
    async fn portfolio_view(&self) -> Result<PortfolioView, PipelineError> {
        let snapshot = self.account.get_balances().await?;
        let prices = self.market.get_market_status().await.ok();

        let mut positions: Vec<PortfolioPosition> = snapshot
            .holdings
            .iter()
            .map(|(&symbol, &quantity)| {
                let value_usd = prices.as_ref().and_then(|market| {
                    market
                        .assets
                        .iter()
                        .find(|a| a.symbol == symbol)
                        .map(|a| quantity * a.spot_usd)
                });
                PortfolioPosition {
                    symbol,
                    quantity,
                    value_usd,
                }
            })
            .collect();
        positions.sort_by_key(|p| p.symbol.ticker());

        let total_usd = positions
            .iter()
            .map(|p| p.value_usd)
            .try_fold(snapshot.buying_power_usd, |acc, v| v.map(|v| acc + v));

        Ok(PortfolioView {
            positions,
            cash_usd: snapshot.buying_power_usd,
            total_usd,
        })
    }

    /// `Normalized → Checked → Submitted → Reconciled | Rejected | Failed`.
    async fn execute_trade(
        &self,
        user_id: &str,
        request: TradeRequest,
    ) -> Result<PipelineOutcome, PipelineError> {
        // Checked: one balance fetch, one price fetch. Failures here are
        // safe to retry — nothing was submitted.
        let account = self.account.get_balances().await?;
        let spot = self.market.get_price(request.symbol).await?;
        if spot <= Decimal::ZERO {
            return Err(GatewayError::rejected(format!(
                "non-positive spot price for {}",
                request.symbol
            ))
            .into());
        }

        let decision = evaluate(&request, &account, spot, &self.rules);
        let (base_amount, notional_usd) = match decision.verdict {
            Verdict::Rejected(reason) => {
                info!(?reason, "Trade rejected by pre-trade checks");
                return Ok(PipelineOutcome::Trade(ExecutionResult::Rejected { reason }));
            }
            Verdict::Approved {
                base_amount,
                notional_usd,
            } => (base_amount, notional_usd),
        };

        // Submitted: exactly one submit call, keyed so an upstream retry
        // of the same logical request collapses downstream.
        let bucket = decision::current_bucket(self.rules.idempotency_bucket_secs);
        let attempt = OrderAttempt {
            user_id: user_id.to_string(),
            side: request.side,
            symbol: request.symbol,
            base_amount,
            notional_usd,
            idempotency_key: decision::idempotency_key(user_id, &request, bucket),
            attempt: 1,
        };
        info!(
            key = %attempt.idempotency_key,
            side = %attempt.side,
            symbol = %attempt.symbol,
            %base_amount,
            %notional_usd,
            "Submitting order"
        );

        let result = match self.orders.submit_order(&attempt).await {
            Ok(fill) => ExecutionResult::Filled {
                order_id: fill.order_id,
                executed_amount: fill.executed_amount,
                executed_price: fill.executed_price,
            },
            Err(e) => {
                warn!(error = %e, retryable = e.retryable, "Order submission failed");
                ExecutionResult::Failed {
                    reason: e.message,
                    retryable: e.retryable,
                }
            }
        };

        Ok(PipelineOutcome::Trade(result))
    }
}
