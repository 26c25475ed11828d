//! HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use rollcall_channels::line::WebhookBody;
use rollcall_channels::line::webhook::{SIGNATURE_HEADER, verify_signature};

use crate::server::AppState;

/// Liveness check.
pub async fn home() -> &'static str {
    "Hello, World!"
}

/// LINE webhook: verify the signature over the raw body, then dispatch. Once
/// the signature checks out the answer is always 200.
pub async fn line_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if let Err(e) = verify_signature(&state.channel_secret, &body, signature) {
        tracing::warn!("[line] rejected webhook: {e}");
        return (StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let payload = match WebhookBody::parse(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("[line] unreadable webhook body: {e}");
            return (StatusCode::OK, "OK");
        }
    };

    let events = payload.inbound_events();
    tracing::debug!("[line] webhook with {} actionable event(s)", events.len());
    state.dispatcher.handle_all(events).await;
    (StatusCode::OK, "OK")
}

/// Weekly broadcast trigger for an external cron service.
pub async fn weekly(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    if let Some(secret) = &state.cron_secret {
        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");
        if provided != secret {
            tracing::warn!("[weekly] unauthorized trigger");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({"message": "Unauthorized"})),
            );
        }
    }

    tracing::info!("[weekly] triggered over HTTP");
    match state.dispatcher.broadcast_weekly().await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({"message": "Cron job executed successfully!"})),
        ),
        Err(e) => {
            tracing::error!("[weekly] broadcast failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"message": format!("Cron job failed: {e}")})),
            )
        }
    }
}
