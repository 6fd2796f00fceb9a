//! Wallet payment handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthOwner;
use crate::error::ApiError;
use crate::handlers::wallet::TransactionResponse;
use crate::state::AppState;

/// Payment request.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// The order being paid for.
    pub order_ref: u64,
    /// Amount in the smallest currency unit.
    pub amount: i64,
}

/// Pay for an order from the wallet balance.
pub async fn pay(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
    Json(body): Json<PaymentRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let tx = state
        .wallets
        .pay_with_wallet(&auth.owner_id, body.order_ref, body.amount)?;

    Ok(Json(TransactionResponse::from(&tx)))
}
