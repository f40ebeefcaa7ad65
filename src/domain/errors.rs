//! Error taxonomy for the intent and execution pipeline.
//!
//! Three families, matching who can fix the problem:
//! - `AdapterError`: the upstream language model (unavailable or nonsense reply)
//! - `NormalizationError`: the user's request does not map to a valid action
//! - `GatewayError`: a downstream brokerage/market service failed
//!
//! Business-rule rejections (insufficient funds, below minimum) are NOT
//! errors — they are verdicts carried by `ExecutionResult::Rejected`.

use thiserror::Error;

/// Failure from the language understanding adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// Utterance was empty after trimming. Short-circuits before any network call.
    #[error("empty message")]
    EmptyInput,
    /// The hosted model could not be reached (network, timeout, 5xx).
    #[error("language model unavailable: {0}")]
    Unavailable(String),
    /// The model replied, but the reply does not match the intent schema.
    ///
    /// This is the common case and is handled as "could not understand",
    /// never as a crash.
    #[error("language model reply did not match the intent schema")]
    MalformedResponse,
}

impl AdapterError {
    /// Whether a repeat request is safe and may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Failure to coerce a `CandidateIntent` into a `NormalizedIntent`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizationError {
    /// Action text matched nothing in the fixed vocabulary.
    #[error("could not map \"{action}\" to a supported action")]
    UnknownIntent { action: String },
    /// Symbol is missing or not on the supported-asset allow-list.
    #[error("unsupported symbol: {raw}")]
    UnsupportedSymbol { raw: String },
    /// Amount is missing, non-numeric, non-positive, non-finite, or above the
    /// per-trade ceiling.
    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },
    /// A trade was requested without an explicit buy/sell side.
    ///
    /// The side is never defaulted — `!trade 0.05 BTC` is an error, not a buy.
    #[error("trade side missing: say buy or sell")]
    MissingSide,
}

/// Category of a downstream gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Network failure, timeout, or 5xx-class response.
    Unavailable,
    /// Credentials rejected (401/403).
    Unauthorized,
    /// Throttled by the brokerage (429).
    RateLimited,
    /// Explicit rejection of the request (4xx, bad params, market closed).
    Rejected,
}

impl std::fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "unavailable"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RateLimited => write!(f, "rate-limited"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Typed failure from the market data, account, or order gateways.
///
/// Gateways never retry internally; the `retryable` flag tells the pipeline
/// (and ultimately the user) whether a repeat request is safe.
#[derive(Debug, Clone, Error)]
#[error("gateway {kind}: {message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl GatewayError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Unauthorized,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: GatewayErrorKind::Rejected,
            message: message.into(),
            retryable: false,
        }
    }
}
