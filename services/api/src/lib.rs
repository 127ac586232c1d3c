//! HTTP bridge between the Home Assistant conversation API and the OpenClaw agent.

pub mod config;
mod error;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use openclaw_bridge_core::extract::extract;
use openclaw_bridge_core::{AgentOutcome, AgentRunner, ConversationResponse, clean_speech};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::BridgeError;

pub const SERVICE_ID: &str = "openclaw-http-bridge";
pub const SERVICE_NAME: &str = "OpenClaw HTTP Bridge";

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    agent: Arc<dyn AgentRunner>,
}

/// Builds the application router around the given agent.
pub fn router(agent: Arc<dyn AgentRunner>) -> Router {
    Router::new()
        .route("/conversation/process", post(process_conversation))
        .route("/health", get(health))
        .route("/", get(index))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { agent })
}

/// Home Assistant conversation agent endpoint.
///
/// Expects `{"text": "user message here"}` and answers in the conversation
/// API's `action_done` shape.
async fn process_conversation(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ConversationResponse>, BridgeError> {
    let message = message_text(&body)?;
    info!(chars = message.chars().count(), "Processing conversation turn");

    match state.agent.run(&message).await? {
        AgentOutcome::Completed { stdout, .. } => {
            let extracted = extract(stdout.trim());
            tracing::debug!(shape = ?extracted.shape, "Extracted agent reply");
            Ok(Json(ConversationResponse::action_done(clean_speech(
                &extracted.text,
            ))))
        }
        AgentOutcome::Failed { stderr, .. } => Err(BridgeError::AgentFailed { details: stderr }),
        AgentOutcome::TimedOut { .. } => Err(BridgeError::Timeout),
    }
}

/// Pulls the user message out of a request body. Anything other than a JSON
/// object with a non-blank string `text` is rejected.
fn message_text(body: &[u8]) -> Result<String, BridgeError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| BridgeError::MissingText)?;
    match value.get("text") {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(BridgeError::MissingText),
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": SERVICE_ID}))
}

async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "conversation/process": "POST - Process conversation",
            "health": "GET - Health check"
        }
    }))
}
