//! Together AI interpreter — natural language to candidate intent.
//!
//! Sends the utterance with a fixed, versioned instruction schema to the
//! Together chat-completions endpoint and salvages a `CandidateIntent`
//! from whatever comes back. A reply that cannot be salvaged is
//! `MalformedResponse` — an everyday outcome, not a fault.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::LlmConfig;
use crate::domain::errors::AdapterError;
use crate::domain::intent::{CandidateIntent, RawUtterance};
use crate::ports::interpreter::IntentInterpreter;

/// Version tag for the instruction prompt. Bump when the schema changes.
const PROMPT_VERSION: &str = "v2";

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Together chat-completions response, reduced to what we read.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Hosted-model interpreter backed by the Together API.
pub struct TogetherInterpreter {
    http: Client,
    api_key: String,
    config: LlmConfig,
}

impl TogetherInterpreter {
    /// Create an interpreter with the key from TOGETHER_API_KEY.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var("TOGETHER_API_KEY").context("TOGETHER_API_KEY not set")?;
        Self::new(api_key, config)
    }

    pub fn new(api_key: String, config: LlmConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_key,
            config,
        })
    }
}

/// The fixed instruction sent with every utterance (schema version: v2).
fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a crypto trading assistant. Analyze the request and respond with ONLY a JSON object, no prose.
The JSON must have exactly these fields:
{{
    "action": "price|portfolio|market|buy|sell",
    "symbol": "BTC|ETH|SOL|DOGE|LTC" or null,
    "amount": number or string or null,
    "unit": "base" or "usd" or null,
    "confidence": number between 0 and 1
}}

Examples:
- "what's the price of BTC?" -> {{"action": "price", "symbol": "BTC", "amount": null, "unit": null, "confidence": 0.95}}
- "show my portfolio" -> {{"action": "portfolio", "symbol": null, "amount": null, "unit": null, "confidence": 0.95}}
- "how's the market" -> {{"action": "market", "symbol": null, "amount": null, "unit": null, "confidence": 0.9}}
- "buy 0.1 eth" -> {{"action": "buy", "symbol": "ETH", "amount": 0.1, "unit": "base", "confidence": 0.9}}
- "sell $50 of bitcoin" -> {{"action": "sell", "symbol": "BTC", "amount": 50, "unit": "usd", "confidence": 0.9}}

If the request is not one of these actions, set "action" to a short lowercase word describing it.

Request: {text}"#
    )
}

/// Salvage a candidate from the model's reply.
///
/// Direct JSON parse first; if the model wrapped the object in prose,
/// retry on the first-`{` .. last-`}` substring.
fn parse_candidate(content: &str) -> Option<CandidateIntent> {
    if let Ok(candidate) = serde_json::from_str::<CandidateIntent>(content) {
        return Some(candidate);
    }
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<CandidateIntent>(&content[start..=end]).ok()
}

#[async_trait]
impl IntentInterpreter for TogetherInterpreter {
    #[instrument(skip(self, utterance), fields(user = %utterance.user_id, prompt_version = PROMPT_VERSION))]
    async fn interpret(&self, utterance: &RawUtterance) -> Result<CandidateIntent, AdapterError> {
        let text = utterance.text.trim();
        if text.is_empty() {
            return Err(AdapterError::EmptyInput);
        }

        let body = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": build_prompt(text) }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
        });

        let response = self
            .http
            .post(format!("{}{CHAT_COMPLETIONS_PATH}", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Language model returned an error status");
            return Err(AdapterError::Unavailable(format!("status {status}")));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|_| AdapterError::MalformedResponse)?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or(AdapterError::MalformedResponse)?;

        debug!(reply = %content, "Language model reply");

        parse_candidate(content).ok_or(AdapterError::MalformedResponse)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::intent::RawAmount;

    use super::*;

    #[test]
    fn parses_a_clean_json_reply() {
        let c = parse_candidate(
            r#"{"action": "buy", "symbol": "ETH", "amount": 0.1, "unit": "base", "confidence": 0.9}"#,
        )
        .unwrap();
        assert_eq!(c.action.as_deref(), Some("buy"));
        assert_eq!(c.symbol.as_deref(), Some("ETH"));
        assert_eq!(c.amount, Some(RawAmount::Number(0.1)));
    }

    #[test]
    fn salvages_json_wrapped_in_prose() {
        let c = parse_candidate(
            "Sure! Here is the analysis:\n{\"action\": \"price\", \"symbol\": \"btc\"}\nHope that helps.",
        )
        .unwrap();
        assert_eq!(c.action.as_deref(), Some("price"));
        assert_eq!(c.symbol.as_deref(), Some("btc"));
    }

    #[test]
    fn accepts_intent_as_action_alias() {
        let c = parse_candidate(r#"{"intent": "portfolio"}"#).unwrap();
        assert_eq!(c.action.as_deref(), Some("portfolio"));
    }

    #[test]
    fn plain_prose_is_unsalvageable() {
        assert!(parse_candidate("I'd love to help you trade!").is_none());
        assert!(parse_candidate("").is_none());
        assert!(parse_candidate("}{").is_none());
    }

    #[test]
    fn prompt_embeds_the_utterance_and_schema() {
        let p = build_prompt("buy 1 btc");
        assert!(p.contains("Request: buy 1 btc"));
        assert!(p.contains("\"action\""));
    }
}
