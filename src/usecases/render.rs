//! Rendering: pipeline outcomes and errors to user-facing messages.
//!
//! Wording is presentation detail, but the contract matters: every
//! outcome and error kind maps to a distinct, non-empty message, and
//! user-correctable problems carry the specific reason while transient
//! ones invite a retry.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::decision::{ExecutionResult, RejectReason};
use crate::domain::errors::{AdapterError, NormalizationError};
use crate::domain::intent::TradeSide;
use crate::ports::market_data::MarketSnapshot;

use super::pipeline::{PipelineError, PipelineOutcome, PortfolioView};

/// Render a completed invocation, success or failure, to chat text.
pub fn render(result: &Result<PipelineOutcome, PipelineError>) -> String {
    match result {
        Ok(outcome) => render_outcome(outcome),
        Err(error) => render_error(error),
    }
}

fn render_outcome(outcome: &PipelineOutcome) -> String {
    match outcome {
        PipelineOutcome::Price { symbol, usd } => {
            format!("{symbol} is trading at ${}", money(*usd))
        }
        PipelineOutcome::Portfolio(view) => render_portfolio(view),
        PipelineOutcome::Market(snapshot) => render_market(snapshot),
        PipelineOutcome::Trade(result) => render_execution(result),
    }
}

fn render_portfolio(view: &PortfolioView) -> String {
    let mut out = String::from("Your portfolio:\n");
    for position in &view.positions {
        match position.value_usd {
            Some(value) => out.push_str(&format!(
                "{}: {} (${})\n",
                position.symbol,
                position.quantity.normalize(),
                money(value)
            )),
            None => out.push_str(&format!(
                "{}: {}\n",
                position.symbol,
                position.quantity.normalize()
            )),
        }
    }
    out.push_str(&format!("Cash: ${}", money(view.cash_usd)));
    if let Some(total) = view.total_usd {
        out.push_str(&format!("\nTotal value: ${}", money(total)));
    }
    out
}

fn render_market(snapshot: &MarketSnapshot) -> String {
    if snapshot.assets.is_empty() {
        return "No market data available right now.".to_string();
    }
    let mut out = String::from("Market status:\n");
    for asset in &snapshot.assets {
        match asset.change_24h_pct {
            Some(change) => out.push_str(&format!(
                "{}: ${} ({}{}% 24h)\n",
                asset.symbol,
                money(asset.spot_usd),
                if change >= Decimal::ZERO { "+" } else { "" },
                change.round_dp(2)
            )),
            None => out.push_str(&format!("{}: ${}\n", asset.symbol, money(asset.spot_usd))),
        }
    }
    out.trim_end().to_string()
}

fn render_execution(result: &ExecutionResult) -> String {
    match result {
        ExecutionResult::Filled {
            order_id,
            executed_amount,
            executed_price,
        } => format!(
            "Trade executed: {} filled at ${} each (order {order_id})",
            executed_amount.normalize(),
            money(*executed_price)
        ),
        ExecutionResult::Rejected { reason } => render_rejection(reason),
        ExecutionResult::Failed { reason, retryable } => {
            if *retryable {
                format!("The brokerage is temporarily unavailable ({reason}). Your order was not confirmed — please try again.")
            } else {
                format!("The brokerage rejected the order: {reason}. Please check your account before retrying.")
            }
        }
    }
}

fn render_rejection(reason: &RejectReason) -> String {
    match reason {
        RejectReason::UnsupportedSymbol { symbol } => {
            format!("{symbol} can't be traded on this account.")
        }
        RejectReason::BelowMinimum {
            base_amount,
            minimum,
        } => format!(
            "That works out to {} units, below the minimum order size of {}.",
            base_amount.normalize(),
            minimum.normalize()
        ),
        RejectReason::InsufficientFunds {
            side: TradeSide::Sell,
            requested,
            available,
        } => format!(
            "You hold {} but asked to sell {}.",
            available.normalize(),
            requested.normalize()
        ),
        RejectReason::InsufficientFunds {
            side: TradeSide::Buy,
            requested,
            available,
        } => format!(
            "That costs ${} but you have ${} available.",
            money(*requested),
            money(*available)
        ),
    }
}

fn render_error(error: &PipelineError) -> String {
    match error {
        PipelineError::Adapter(AdapterError::EmptyInput) => {
            "Say something and I'll try to help — e.g. \"buy 0.1 eth\" or \"!price btc\".".to_string()
        }
        PipelineError::Adapter(AdapterError::Unavailable(_)) => {
            "I'm having trouble reaching my language model. Please try again in a moment.".to_string()
        }
        // The model replied nonsense; ask the user to rephrase rather
        // than exposing a system fault.
        PipelineError::Adapter(AdapterError::MalformedResponse) => {
            "I couldn't understand that. Try something like \"buy 0.1 eth\", \"sell $50 of btc\", or \"!portfolio\".".to_string()
        }
        PipelineError::Normalization(e) => render_normalization_error(e),
        PipelineError::Gateway(e) if e.retryable => {
            "That service is temporarily unavailable. Nothing was executed — please retry shortly.".to_string()
        }
        PipelineError::Gateway(e) => {
            format!("Request failed: {}. Nothing was executed.", e.message)
        }
    }
}

fn render_normalization_error(error: &NormalizationError) -> String {
    match error {
        NormalizationError::UnknownIntent { .. } => {
            "I'm not sure what you want to do. I can quote prices, show your portfolio or the market, and buy or sell.".to_string()
        }
        NormalizationError::UnsupportedSymbol { raw } => {
            format!("I don't support \"{raw}\". Supported assets: BTC, ETH, SOL, DOGE, LTC.")
        }
        NormalizationError::InvalidAmount { reason } => {
            format!("That amount doesn't work: {reason}.")
        }
        NormalizationError::MissingSide => {
            "Do you want to buy or sell? Say e.g. \"!trade buy 0.05 btc\".".to_string()
        }
    }
}

fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
