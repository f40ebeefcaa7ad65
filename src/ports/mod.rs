//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `IntentInterpreter`: hosted language model turning text into a candidate intent
//! - `MarketData`: read-only price and market-status lookups
//! - `AccountGateway`: portfolio balances and buying power
//! - `OrderGateway`: single submit operation against the brokerage
//!
//! No retries or caching live behind these traits — all failure policy is
//! centralized in the trade execution pipeline.

pub mod account;
pub mod interpreter;
pub mod market_data;
pub mod orders;

pub use account::AccountGateway;
pub use interpreter::IntentInterpreter;
pub use market_data::{AssetStatus, MarketData, MarketSnapshot};
pub use orders::{OrderFill, OrderGateway};
