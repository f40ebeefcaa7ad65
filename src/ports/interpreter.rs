//! Language understanding port - utterance to candidate intent.

use async_trait::async_trait;

use crate::domain::errors::AdapterError;
use crate::domain::intent::{CandidateIntent, RawUtterance};

/// Trait for hosted language model adapters.
///
/// Implementors send the utterance plus a fixed instruction schema to a
/// model and return its best-effort structured reading. The output is
/// loosely typed on purpose — only the normalizer decides what is valid.
#[async_trait]
pub trait IntentInterpreter: Send + Sync + 'static {
    /// Interpret a raw user utterance.
    ///
    /// Must short-circuit on empty (post-trim) input with
    /// `AdapterError::EmptyInput` and make no network call.
    ///
    /// # Errors
    /// `Unavailable` on network/timeout failure (retryable);
    /// `MalformedResponse` when the reply cannot be coerced into a
    /// `CandidateIntent` (common, not a crash).
    async fn interpret(&self, utterance: &RawUtterance) -> Result<CandidateIntent, AdapterError>;
}
