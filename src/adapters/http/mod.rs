//! HTTP transport shim — the thin front-end the chat listener talks to.
//!
//! One route does the work: `POST /query` takes `{user_id, text}` and
//! returns the rendered reply for exactly one pipeline invocation. The
//! rest is observability: `/live`, `/ready` (503 during shutdown), and
//! `/metrics`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{error, instrument, Instrument};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::decision::{ExecutionResult, RejectReason};
use crate::domain::errors::GatewayError;
use crate::usecases::pipeline::{PipelineError, PipelineOutcome, TradePipeline};
use crate::usecases::render::render;

/// Shared state behind the router.
pub struct AppState {
    pub pipeline: Arc<TradePipeline>,
    pub metrics: Arc<MetricsRegistry>,
    /// Flipped to false during graceful shutdown.
    pub ready: watch::Receiver<bool>,
}

/// Incoming chat message. `prompt` is accepted as an alias for `text`
/// for compatibility with the original listener payload.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(alias = "prompt")]
    pub text: String,
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Build the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(query))
        .route("/live", get(|| async { StatusCode::OK }))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .with_state(state)
}

#[instrument(
    skip(state, request),
    fields(request_id = %uuid::Uuid::new_v4(), user = %request.user_id)
)]
async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    state.metrics.messages.inc();

    // Detached task: if the client disconnects mid-request, the in-flight
    // brokerage call still runs to completion so no order is left in an
    // unknown state; only the reply is discarded.
    let pipeline = Arc::clone(&state.pipeline);
    let user_id = request.user_id.clone();
    let text = request.text.clone();
    let invocation =
        tokio::spawn(async move { pipeline.handle(&user_id, &text).await }.in_current_span());

    let result = match invocation.await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Pipeline task panicked");
            Err(PipelineError::Gateway(GatewayError::unavailable(
                "internal error",
            )))
        }
    };
    record(&state.metrics, &result);
    Json(QueryResponse {
        response: render(&result),
    })
}

async fn ready(State(state): State<Arc<AppState>>) -> StatusCode {
    if *state.ready.borrow() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.encode()
}

/// Update counters from a finished invocation.
fn record(metrics: &MetricsRegistry, result: &Result<PipelineOutcome, PipelineError>) {
    match result {
        Ok(outcome) => {
            let kind = match outcome {
                PipelineOutcome::Price { .. } => "price",
                PipelineOutcome::Portfolio(_) => "portfolio",
                PipelineOutcome::Market(_) => "market",
                PipelineOutcome::Trade(_) => "trade",
            };
            metrics.intents.with_label_values(&[kind]).inc();

            if let PipelineOutcome::Trade(execution) = outcome {
                match execution {
                    ExecutionResult::Filled { .. } => {
                        metrics.orders_submitted.inc();
                        metrics.orders_filled.inc();
                    }
                    // Failed implies a submit call was made; pre-submit
                    // problems surface as PipelineError::Gateway instead.
                    ExecutionResult::Failed { .. } => metrics.orders_submitted.inc(),
                    ExecutionResult::Rejected { reason } => {
                        let label = match reason {
                            RejectReason::UnsupportedSymbol { .. } => "unsupported_symbol",
                            RejectReason::BelowMinimum { .. } => "below_minimum",
                            RejectReason::InsufficientFunds { .. } => "insufficient_funds",
                        };
                        metrics.trade_rejections.with_label_values(&[label]).inc();
                    }
                }
            }
        }
        Err(error) => {
            let family = match error {
                PipelineError::Adapter(_) => "adapter",
                PipelineError::Normalization(_) => "normalization",
                PipelineError::Gateway(_) => "gateway",
            };
            metrics.errors.with_label_values(&[family]).inc();
        }
    }
}
