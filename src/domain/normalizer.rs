//! Intent normalizer: the single choke point between loose model output
//! and the closed `NormalizedIntent` sum type.
//!
//! `normalize` is a pure function of its inputs — same candidate, same
//! rules, same result. Anything ambiguous is rejected here; nothing
//! partially-filled ever flows past this boundary.
//!
//! Tie-break: for trade intents, symbol resolution is checked BEFORE amount
//! parsing, so a request that is wrong on both counts always reports
//! `UnsupportedSymbol`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::errors::NormalizationError;
use super::intent::{
    AmountKind, CandidateIntent, NormalizedIntent, RawAmount, Symbol, TradeRequest, TradeSide,
};

/// Read-only trading rules, built once from config at startup.
#[derive(Debug, Clone)]
pub struct TradingRules {
    /// Symbols the deployment accepts (subset of the `Symbol` enum).
    pub allowed: Vec<Symbol>,
    /// Symbols blocked for this account even though globally supported.
    pub restricted: Vec<Symbol>,
    /// Minimum order size in base units.
    pub min_order_size: Decimal,
    /// Per-trade notional ceiling in USD.
    pub max_trade_usd: Decimal,
    /// Width of the idempotency time bucket in seconds.
    pub idempotency_bucket_secs: u64,
}

impl TradingRules {
    pub fn is_allowed(&self, symbol: Symbol) -> bool {
        self.allowed.contains(&symbol)
    }

    pub fn is_restricted(&self, symbol: Symbol) -> bool {
        self.restricted.contains(&symbol)
    }
}

/// Validate and coerce a candidate into a normalized intent, or reject it.
pub fn normalize(
    candidate: &CandidateIntent,
    rules: &TradingRules,
) -> Result<NormalizedIntent, NormalizationError> {
    let action = candidate
        .action
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(NormalizationError::UnknownIntent {
            action: "<none>".to_string(),
        })?;

    match action.to_ascii_lowercase().as_str() {
        "price" | "quote" | "cost" => {
            let symbol = resolve_symbol(candidate, rules)?;
            Ok(NormalizedIntent::PriceQuery { symbol })
        }
        "portfolio" | "balance" | "balances" | "holdings" => Ok(NormalizedIntent::PortfolioQuery),
        "market" | "status" => Ok(NormalizedIntent::MarketStatusQuery),
        "buy" | "purchase" | "long" => normalize_trade(TradeSide::Buy, candidate, rules),
        "sell" | "dump" | "short" => normalize_trade(TradeSide::Sell, candidate, rules),
        // The model (or the `!trade` command) flagged a trade without
        // committing to a side. Never guess — refuse.
        "trade" => Err(NormalizationError::MissingSide),
        other => Err(NormalizationError::UnknownIntent {
            action: other.to_string(),
        }),
    }
}

fn normalize_trade(
    side: TradeSide,
    candidate: &CandidateIntent,
    rules: &TradingRules,
) -> Result<NormalizedIntent, NormalizationError> {
    // Symbol before amount: stable precedence when both are wrong.
    let symbol = resolve_symbol(candidate, rules)?;
    let (amount, amount_kind) = parse_amount(candidate, rules)?;
    Ok(NormalizedIntent::Trade(TradeRequest {
        side,
        symbol,
        amount,
        amount_kind,
    }))
}

fn resolve_symbol(
    candidate: &CandidateIntent,
    rules: &TradingRules,
) -> Result<Symbol, NormalizationError> {
    let raw = candidate
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(NormalizationError::UnsupportedSymbol {
            raw: "<none>".to_string(),
        })?;

    let symbol = Symbol::resolve(raw).ok_or_else(|| NormalizationError::UnsupportedSymbol {
        raw: raw.to_string(),
    })?;

    if !rules.is_allowed(symbol) {
        return Err(NormalizationError::UnsupportedSymbol {
            raw: raw.to_string(),
        });
    }

    Ok(symbol)
}

/// Parse the candidate's amount into a positive `Decimal` plus its
/// denomination.
///
/// Defaults to base units; a `$` prefix / `usd` marker on the amount text
/// or an explicit `unit` hint switches to quote (USD) units.
fn parse_amount(
    candidate: &CandidateIntent,
    rules: &TradingRules,
) -> Result<(Decimal, AmountKind), NormalizationError> {
    let raw = candidate
        .amount
        .as_ref()
        .ok_or(NormalizationError::InvalidAmount {
            reason: "no amount given".to_string(),
        })?;

    let mut kind = unit_hint(candidate.unit.as_deref());

    let amount = match raw {
        RawAmount::Number(n) => {
            Decimal::from_f64(*n).ok_or(NormalizationError::InvalidAmount {
                reason: format!("{n} is not a finite number"),
            })?
        }
        RawAmount::Text(text) => {
            let mut cleaned = text.trim().to_ascii_lowercase();
            if let Some(rest) = cleaned.strip_prefix('$') {
                kind = Some(AmountKind::QuoteUsd);
                cleaned = rest.trim().to_string();
            }
            for marker in ["usd", "dollars", "bucks"] {
                if let Some(rest) = cleaned.strip_suffix(marker) {
                    kind = Some(AmountKind::QuoteUsd);
                    cleaned = rest.trim().to_string();
                    break;
                }
            }
            cleaned.replace(',', "").parse::<Decimal>().map_err(|_| {
                NormalizationError::InvalidAmount {
                    reason: format!("could not parse \"{text}\" as a number"),
                }
            })?
        }
    };

    if amount <= Decimal::ZERO {
        return Err(NormalizationError::InvalidAmount {
            reason: format!("amount must be greater than zero, got {amount}"),
        });
    }

    // Sanity ceiling on the raw value, whatever its denomination. A typo
    // like "buy 50000 eth" dies here rather than at the brokerage.
    if amount > rules.max_trade_usd {
        return Err(NormalizationError::InvalidAmount {
            reason: format!(
                "{amount} exceeds the per-trade ceiling of {}",
                rules.max_trade_usd
            ),
        });
    }

    Ok((amount, kind.unwrap_or(AmountKind::BaseUnits)))
}

fn unit_hint(unit: Option<&str>) -> Option<AmountKind> {
    match unit.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        Some("usd" | "quote" | "dollars" | "$") => Some(AmountKind::QuoteUsd),
        Some("base" | "asset" | "crypto") => Some(AmountKind::BaseUnits),
        _ => None,
    }
}
