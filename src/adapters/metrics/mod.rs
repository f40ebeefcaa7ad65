//! Prometheus Metrics Registry - Pipeline Observability
//!
//! Registers and exposes the counters behind `/metrics`. Covers message
//! volume, intent mix, order lifecycle, and rejection reasons.

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Centralized Prometheus metrics for the trading assistant.
///
/// All metrics follow the naming convention `frank_bot_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Total messages handled.
    pub messages: IntCounter,
    /// Normalized intents by kind (price/portfolio/market/trade).
    pub intents: IntCounterVec,
    /// Orders submitted to the brokerage.
    pub orders_submitted: IntCounter,
    /// Orders confirmed filled.
    pub orders_filled: IntCounter,
    /// Pre-trade rejections by reason.
    pub trade_rejections: IntCounterVec,
    /// User-visible errors by family (adapter/normalization/gateway).
    pub errors: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let messages = IntCounter::new("frank_bot_messages_total", "Total messages handled")?;

        let intents = IntCounterVec::new(
            Opts::new("frank_bot_intents_total", "Normalized intents by kind"),
            &["kind"],
        )?;

        let orders_submitted = IntCounter::new(
            "frank_bot_orders_submitted_total",
            "Orders submitted to the brokerage",
        )?;

        let orders_filled = IntCounter::new(
            "frank_bot_orders_filled_total",
            "Orders confirmed filled by the brokerage",
        )?;

        let trade_rejections = IntCounterVec::new(
            Opts::new(
                "frank_bot_trade_rejections_total",
                "Pre-trade rejections by reason",
            ),
            &["reason"],
        )?;

        let errors = IntCounterVec::new(
            Opts::new("frank_bot_errors_total", "User-visible errors by family"),
            &["family"],
        )?;

        registry.register(Box::new(messages.clone()))?;
        registry.register(Box::new(intents.clone()))?;
        registry.register(Box::new(orders_submitted.clone()))?;
        registry.register(Box::new(orders_filled.clone()))?;
        registry.register(Box::new(trade_rejections.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            messages,
            intents,
            orders_submitted,
            orders_filled,
            trade_rejections,
            errors,
        })
    }

    /// Encode all metrics in the Prometheus text format.
    pub fn encode(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_encoded_output() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.messages.inc();
        metrics.intents.with_label_values(&["price"]).inc();
        let text = metrics.encode();
        assert!(text.contains("frank_bot_messages_total 1"));
        assert!(text.contains("frank_bot_intents_total"));
    }
}
