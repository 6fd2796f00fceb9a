//! Deposit intent and confirmation handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthOwner;
use crate::error::ApiError;
use crate::handlers::wallet::TransactionResponse;
use crate::state::AppState;

/// Deposit intent request.
#[derive(Debug, Deserialize)]
pub struct DepositIntentRequest {
    /// Amount to deposit in the smallest currency unit.
    pub amount: i64,
}

/// Deposit intent response.
#[derive(Debug, Serialize)]
pub struct DepositIntentResponse {
    /// Gateway payment-intent id; pass back to confirm.
    pub intent_id: String,
    /// Client secret for completing the payment on the client side.
    pub client_secret: String,
}

/// Start a deposit by creating a gateway payment intent.
pub async fn create_deposit_intent(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
    Json(body): Json<DepositIntentRequest>,
) -> Result<Json<DepositIntentResponse>, ApiError> {
    let intent = state
        .wallets
        .create_deposit_intent(&auth.owner_id, body.amount)
        .await?;

    Ok(Json(DepositIntentResponse {
        intent_id: intent.intent_id,
        client_secret: intent.client_secret,
    }))
}

/// Deposit confirmation request.
#[derive(Debug, Deserialize)]
pub struct DepositConfirmRequest {
    /// The payment-intent id returned when the deposit was created.
    pub intent_id: String,
}

/// Confirm a deposit after the client has completed the gateway payment.
pub async fn confirm_deposit(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
    Json(body): Json<DepositConfirmRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let tx = state
        .wallets
        .confirm_deposit(&auth.owner_id, &body.intent_id)
        .await?;

    Ok(Json(TransactionResponse::from(&tx)))
}
