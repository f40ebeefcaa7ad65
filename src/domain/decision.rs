//! Pre-trade decision logic and the order attempt it produces.
//!
//! `evaluate` is a pure function: given a validated trade request, the
//! account snapshot, a spot price, and the trading rules, it returns a
//! verdict. No gateway is ever called from here, which is what makes the
//! rejection paths trivially testable.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::intent::{AmountKind, Symbol, TradeRequest, TradeSide};
use super::normalizer::TradingRules;

/// Account balances at decision time.
#[derive(Debug, Clone, Default)]
pub struct AccountSnapshot {
    /// USD available to spend on buys.
    pub buying_power_usd: Decimal,
    /// Held base-unit quantity per symbol.
    pub holdings: HashMap<Symbol, Decimal>,
}

impl AccountSnapshot {
    /// Held quantity for a symbol, zero if none.
    pub fn holding(&self, symbol: Symbol) -> Decimal {
        self.holdings.get(&symbol).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Why a trade was refused before submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Symbol is blocked for this account.
    UnsupportedSymbol { symbol: Symbol },
    /// Computed base amount is under the minimum order size.
    BelowMinimum {
        base_amount: Decimal,
        minimum: Decimal,
    },
    /// Sell exceeds holdings, or buy notional exceeds buying power.
    InsufficientFunds {
        side: TradeSide,
        requested: Decimal,
        available: Decimal,
    },
}

/// Outcome of the pre-trade checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approved {
        /// Amount in base units after quote conversion.
        base_amount: Decimal,
        /// USD value of the trade at the decision-time spot price.
        notional_usd: Decimal,
    },
    Rejected(RejectReason),
}

/// A trade request plus the account state it was judged against.
///
/// Created and consumed within a single pipeline invocation; never persisted.
#[derive(Debug, Clone)]
pub struct TradeDecision {
    pub request: TradeRequest,
    pub buying_power_usd: Decimal,
    pub held: Decimal,
    pub spot_usd: Decimal,
    pub verdict: Verdict,
}

/// An approved decision, keyed and ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAttempt {
    pub user_id: String,
    pub side: TradeSide,
    pub symbol: Symbol,
    /// Base-unit quantity to trade.
    pub base_amount: Decimal,
    /// USD notional at decision time.
    pub notional_usd: Decimal,
    /// Deterministic key collapsing duplicate submissions downstream.
    pub idempotency_key: String,
    /// 1-based attempt count within this invocation.
    pub attempt: u32,
}

/// Terminal record of a trade, handed to the transport shim for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionResult {
    Filled {
        order_id: String,
        executed_amount: Decimal,
        executed_price: Decimal,
    },
    Rejected {
        reason: RejectReason,
    },
    Failed {
        reason: String,
        retryable: bool,
    },
}

/// Apply the pre-trade verdict rules, in order:
/// 1. restricted symbol, 2. below minimum, 3. insufficient funds, 4. approved.
///
/// `spot_usd` must be strictly positive; the pipeline validates this before
/// calling.
pub fn evaluate(
    request: &TradeRequest,
    account: &AccountSnapshot,
    spot_usd: Decimal,
    rules: &TradingRules,
) -> TradeDecision {
    let base_amount = match request.amount_kind {
        AmountKind::BaseUnits => request.amount,
        AmountKind::QuoteUsd => request.amount / spot_usd,
    };
    let notional_usd = base_amount * spot_usd;
    let held = account.holding(request.symbol);

    let verdict = if rules.is_restricted(request.symbol) {
        Verdict::Rejected(RejectReason::UnsupportedSymbol {
            symbol: request.symbol,
        })
    } else if base_amount < rules.min_order_size {
        Verdict::Rejected(RejectReason::BelowMinimum {
            base_amount,
            minimum: rules.min_order_size,
        })
    } else {
        match request.side {
            TradeSide::Sell if base_amount > held => {
                Verdict::Rejected(RejectReason::InsufficientFunds {
                    side: TradeSide::Sell,
                    requested: base_amount,
                    available: held,
                })
            }
            TradeSide::Buy if notional_usd > account.buying_power_usd => {
                Verdict::Rejected(RejectReason::InsufficientFunds {
                    side: TradeSide::Buy,
                    requested: notional_usd,
                    available: account.buying_power_usd,
                })
            }
            _ => Verdict::Approved {
                base_amount,
                notional_usd,
            },
        }
    };

    TradeDecision {
        request: request.clone(),
        buying_power_usd: account.buying_power_usd,
        held,
        spot_usd,
        verdict,
    }
}

/// Current idempotency time bucket (Unix seconds / bucket width).
pub fn current_bucket(bucket_secs: u64) -> u64 {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
    now / bucket_secs.max(1)
}

/// Derive the idempotency key for a logical trade request.
///
/// SHA-256 over user id, side, symbol, requested amount, and the coarse
/// time bucket, hex-encoded. Two retries of the same logical request within
/// one bucket produce the same key, so the brokerage collapses them into a
/// single execution.
pub fn idempotency_key(user_id: &str, request: &TradeRequest, bucket: u64) -> String {
    let message = format!(
        "{user_id}|{}|{}|{}|{:?}|{bucket}",
        request.side,
        request.symbol,
        request.amount.normalize(),
        request.amount_kind,
    );
    let digest = hmac_sha256::Hash::hash(message.as_bytes());
    digest.iter().fold(String::with_capacity(64), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}
