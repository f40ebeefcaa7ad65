//! Domain layer - intent resolution and pre-trade decision logic.
//!
//! Pure business logic for the chat-trading pipeline (hexagonal inner ring):
//! no I/O, no network, everything testable in isolation.

pub mod commands;
pub mod decision;
pub mod errors;
pub mod intent;
pub mod normalizer;

// Re-export core types for convenience
pub use decision::{
    evaluate, AccountSnapshot, ExecutionResult, OrderAttempt, RejectReason, TradeDecision, Verdict,
};
pub use errors::{AdapterError, GatewayError, GatewayErrorKind, NormalizationError};
pub use intent::{
    AmountKind, CandidateIntent, NormalizedIntent, RawAmount, RawUtterance, Symbol, TradeRequest,
    TradeSide,
};
pub use normalizer::{normalize, TradingRules};
