//! Administrative handlers (approver only).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use paybox_core::OwnerId;

use crate::auth::ApproverAuth;
use crate::error::ApiError;
use crate::handlers::wallet::WalletResponse;
use crate::state::AppState;

/// Wallet activation request.
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    /// Whether the wallet should accept balance changes.
    pub active: bool,
}

/// Activate or deactivate an owner's wallet.
pub async fn set_wallet_active(
    State(state): State<Arc<AppState>>,
    auth: ApproverAuth,
    Path(owner_id): Path<String>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<WalletResponse>, ApiError> {
    let owner_id = owner_id
        .parse::<OwnerId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid owner id: {owner_id}")))?;

    let wallet = state.wallets.set_wallet_active(&owner_id, body.active)?;

    tracing::info!(
        approver_id = %auth.approver_id,
        owner_id = %owner_id,
        active = %body.active,
        "Wallet activation changed by approver"
    );

    Ok(Json(WalletResponse::from(&wallet)))
}
