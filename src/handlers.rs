use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::config::IgnoredReply;
use crate::error::RelayError;
use crate::relay::Relay;
use crate::types::{ErrorResponse, HealthResponse, InboundPayload};

pub struct AppState {
    pub relay: Relay,
    pub webhook_token: Option<String>,
}

pub async fn webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let log = state.relay.request_log();
    log.trace("Webhook received");

    let payload: InboundPayload = serde_json::from_slice(&body).map_err(|e| {
        log.info(format_args!("Invalid JSON format: {}", e));
        RelayError::MalformedPayload("Invalid webhook format.")
    })?;

    match state.relay.handle(&payload, &log).await {
        Ok(_) => Ok((StatusCode::OK, "✅ Video sent successfully!").into_response()),
        Err(RelayError::IgnoredSender(jid))
            if state.relay.ignored_reply() == IgnoredReply::Acknowledge =>
        {
            log.info(format_args!("Ignored remoteJid: {}", jid));
            Ok((StatusCode::OK, "❌ Ignored remoteJid").into_response())
        }
        Err(e) => {
            if e.is_rejection() {
                log.info(format_args!("Rejected: {}", e));
            } else {
                log.warn(format_args!("Relay failed: {}", e));
            }
            Err(e)
        }
    }
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method Not Allowed".to_string(),
        }),
    )
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
