//! Intent types: from raw chat text to a closed, validated sum type.
//!
//! `CandidateIntent` is the loosely-typed shape the language model emits;
//! it is never trusted directly. `NormalizedIntent` is the closed set of
//! actions the rest of the system accepts — a value of this type is either
//! fully well-formed or does not exist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's message plus the opaque identifier of who sent it.
///
/// Created per incoming message by the transport shim, discarded after the
/// pipeline returns.
#[derive(Debug, Clone)]
pub struct RawUtterance {
    pub user_id: String,
    pub text: String,
}

/// Supported cryptocurrency assets.
///
/// The closed allow-list. Config may restrict it further but can never
/// extend it — anything outside this enum is an unsupported symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    BTC,
    ETH,
    SOL,
    DOGE,
    LTC,
}

impl Symbol {
    /// Canonical ticker string.
    pub fn ticker(self) -> &'static str {
        match self {
            Self::BTC => "BTC",
            Self::ETH => "ETH",
            Self::SOL => "SOL",
            Self::DOGE => "DOGE",
            Self::LTC => "LTC",
        }
    }

    /// Brokerage product identifier (USD-quoted spot pair).
    pub fn product_id(self) -> String {
        format!("{}-USD", self.ticker())
    }

    /// Resolve free text to a symbol, case- and alias-insensitively.
    ///
    /// `"btc"`, `"BTC"`, and `"bitcoin"` all resolve to `Symbol::BTC`.
    pub fn resolve(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "btc" | "xbt" | "bitcoin" => Some(Self::BTC),
            "eth" | "ether" | "ethereum" => Some(Self::ETH),
            "sol" | "solana" => Some(Self::SOL),
            "doge" | "dogecoin" => Some(Self::DOGE),
            "ltc" | "litecoin" => Some(Self::LTC),
            _ => None,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ticker())
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// How a trade amount is denominated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmountKind {
    /// Units of the asset itself ("0.1 ETH").
    BaseUnits,
    /// US dollars of the asset ("$50 of ETH").
    QuoteUsd,
}

/// Amount as the model emits it: a bare number or free text like `"$50"`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

/// Loosely-typed model output. May be incomplete or inconsistent.
///
/// Every field is optional because the model honors the schema only on a
/// good day. The normalizer is the single choke point that turns this into
/// a `NormalizedIntent` or rejects it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CandidateIntent {
    /// Free-text action name ("price", "buy", ...). Models occasionally
    /// call this field "intent"; both spellings are accepted.
    #[serde(default, alias = "intent")]
    pub action: Option<String>,
    /// Free-text symbol ("btc", "Ethereum", ...).
    #[serde(default)]
    pub symbol: Option<String>,
    /// Amount, number or text.
    #[serde(default)]
    pub amount: Option<RawAmount>,
    /// Denomination hint from the model ("base" or "usd"/"quote").
    #[serde(default)]
    pub unit: Option<String>,
    /// Model self-reported confidence, if any. Logged, never trusted.
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A fully validated trade instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRequest {
    pub side: TradeSide,
    pub symbol: Symbol,
    /// Strictly positive and at or below the per-trade ceiling.
    pub amount: Decimal,
    pub amount_kind: AmountKind,
}

/// The closed set of actions the pipeline executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedIntent {
    PriceQuery { symbol: Symbol },
    PortfolioQuery,
    MarketStatusQuery,
    Trade(TradeRequest),
}

impl NormalizedIntent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PriceQuery { .. } => "price",
            Self::PortfolioQuery => "portfolio",
            Self::MarketStatusQuery => "market",
            Self::Trade(_) => "trade",
        }
    }
}
