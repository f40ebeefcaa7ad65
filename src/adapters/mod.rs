//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! integrations: the Coinbase brokerage gateways, the Together AI
//! interpreter, the axum transport shim, and Prometheus metrics.

pub mod coinbase;
pub mod http;
pub mod llm;
pub mod metrics;
