//! Payment gateway webhook handler.
//!
//! The gateway pushes intent state changes here so deposits settle even
//! when the client never calls the confirmation endpoint. Deliveries are
//! verified against the configured signing secret and handled through the
//! same idempotent settle/fail transitions the confirmation path uses, so
//! a webhook and a confirm can race safely.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use paybox_store::StoreError;

use crate::crypto;
use crate::error::ApiError;
use crate::state::AppState;

/// Gateway webhook payload.
#[derive(Debug, Deserialize)]
pub struct GatewayWebhook {
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event ID.
    pub id: String,
    /// Event data.
    pub data: GatewayEventData,
}

/// Gateway event data container.
#[derive(Debug, Deserialize)]
pub struct GatewayEventData {
    /// Event object.
    pub object: serde_json::Value,
}

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Whether the webhook was processed.
    pub received: bool,
}

/// Handle gateway webhooks.
pub async fn gateway_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    if let Some(secret) = &state.config.gateway_webhook_secret {
        let signature = headers
            .get("gateway-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("Missing gateway signature".into()))?;

        if !crypto::verify_webhook_signature(secret, &body, signature) {
            tracing::warn!("Invalid gateway webhook signature");
            return Err(ApiError::BadRequest("Invalid webhook signature".into()));
        }
    } else {
        // No signing secret configured - skip verification (development mode)
        tracing::warn!("Gateway webhook secret not configured - skipping signature verification");
    }

    let webhook: GatewayWebhook =
        serde_json::from_str(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(
        event_type = %webhook.event_type,
        event_id = %webhook.id,
        "Received gateway webhook"
    );

    match webhook.event_type.as_str() {
        "payment_intent.succeeded" => {
            handle_intent_succeeded(&state, &webhook.data.object)?;
        }
        "payment_intent.payment_failed" => {
            handle_intent_failed(&state, &webhook.data.object)?;
        }
        _ => {
            tracing::debug!(event_type = %webhook.event_type, "Unhandled gateway event");
        }
    }

    Ok(Json(WebhookResponse { received: true }))
}

fn intent_id(data: &serde_json::Value) -> Result<&str, ApiError> {
    data.get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::BadRequest("Missing intent id".into()))
}

fn handle_intent_succeeded(state: &AppState, data: &serde_json::Value) -> Result<(), ApiError> {
    let intent_id = intent_id(data)?;

    match state.store.settle_deposit(intent_id) {
        Ok(settlement) if settlement.newly_applied => {
            tracing::info!(
                intent_id = %intent_id,
                amount = %settlement.transaction.amount,
                "Deposit credited from gateway webhook"
            );
            Ok(())
        }
        Ok(_) => Ok(()),
        // Deliveries can arrive for intents we never recorded (another
        // environment sharing the gateway account) or that already failed.
        // Acknowledge so the gateway stops retrying.
        Err(StoreError::NotFound { .. }) => {
            tracing::warn!(intent_id = %intent_id, "Webhook for unknown deposit intent");
            Ok(())
        }
        Err(StoreError::DepositNotPending { .. }) => {
            tracing::debug!(intent_id = %intent_id, "Webhook for already-terminal deposit");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_intent_failed(state: &AppState, data: &serde_json::Value) -> Result<(), ApiError> {
    let intent_id = intent_id(data)?;

    match state.store.fail_deposit(intent_id) {
        Ok(_) => {
            tracing::info!(intent_id = %intent_id, "Deposit failed from gateway webhook");
            Ok(())
        }
        Err(StoreError::NotFound { .. }) => {
            tracing::warn!(intent_id = %intent_id, "Webhook for unknown deposit intent");
            Ok(())
        }
        Err(StoreError::DepositNotPending { .. }) => {
            tracing::debug!(intent_id = %intent_id, "Webhook for already-terminal deposit");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
