//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement
//! the chat-to-trade flow: the execution pipeline and the renderer
//! that turns its results into user-facing messages.

pub mod pipeline;
pub mod render;

pub use pipeline::{PipelineError, PipelineOutcome, TradePipeline};
pub use render::render;
