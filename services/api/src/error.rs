use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openclaw_bridge_core::AgentError;
use serde_json::json;

/// Everything that can end a conversation request without a reply.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Missing 'text' field")]
    MissingText,
    #[error("OpenClaw failed")]
    AgentFailed { details: String },
    #[error("OpenClaw agent timeout")]
    Timeout,
    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl BridgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::MissingText => StatusCode::BAD_REQUEST,
            BridgeError::AgentFailed { .. } | BridgeError::Agent(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BridgeError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            BridgeError::AgentFailed { details } => {
                tracing::error!(%details, "OpenClaw exited with an error");
                json!({"error": self.to_string(), "details": details})
            }
            BridgeError::Agent(err) => {
                tracing::error!(error = %err, "Conversation request failed");
                json!({"error": self.to_string()})
            }
            BridgeError::Timeout => {
                tracing::warn!("OpenClaw agent timed out");
                json!({"error": self.to_string()})
            }
            BridgeError::MissingText => json!({"error": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}
