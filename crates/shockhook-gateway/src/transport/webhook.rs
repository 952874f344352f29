//! `POST /command/{token}`: chat integration webhook.
//!
//! The token is checked before the body is looked at, so an unauthorized
//! caller learns nothing and never reaches the policy store.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;

use shockhook_core::command::{InboundCommand, WebhookResponse};
use shockhook_core::error::ShockhookError;

use super::ApiError;
use crate::app_state::AppState;

pub async fn command(
    State(app): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Err(e) = app.check_token(&token) {
        app.metrics().webhook_rejections.inc(&[("reason", "auth")]);
        tracing::warn!("webhook rejected, invalid token");
        return Err(e.into());
    }

    let cmd: InboundCommand = serde_json::from_slice(&body).map_err(|e| {
        app.metrics().webhook_rejections.inc(&[("reason", "decode")]);
        ShockhookError::BadRequest(format!("invalid webhook body: {e}"))
    })?;

    tracing::info!(
        author_user = %cmd.author_user,
        target_user = %cmd.target_user,
        room_id = ?cmd.room_id,
        command = %cmd.command,
        "received webhook command"
    );

    let decision = app.dispatcher().dispatch(&cmd).await;
    app.metrics()
        .dispatch_decisions
        .inc(&[("decision", decision.label())]);
    tracing::debug!(decision = decision.label(), "webhook handled");

    Ok(Json(decision.into_response()))
}
