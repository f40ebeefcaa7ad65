//! Language understanding adapters.

pub mod together;

pub use together::TogetherInterpreter;
