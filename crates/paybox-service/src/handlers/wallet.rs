//! Wallet balance and transaction history handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use paybox_core::{Transaction, Wallet};

use crate::auth::AuthOwner;
use crate::error::ApiError;
use crate::state::AppState;

/// Wallet response.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Wallet ID.
    pub id: String,
    /// Balance in the smallest currency unit.
    pub balance: i64,
    /// Whether the wallet accepts balance changes.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<&Wallet> for WalletResponse {
    fn from(wallet: &Wallet) -> Self {
        Self {
            id: wallet.id.to_string(),
            balance: wallet.balance,
            is_active: wallet.is_active,
            created_at: wallet.created_at.to_rfc3339(),
        }
    }
}

/// Get the authenticated owner's wallet, creating it on first access.
pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.wallets.wallet(&auth.owner_id)?;
    Ok(Json(WalletResponse::from(&wallet)))
}

/// Transaction list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Maximum number of transactions to return (default: 50).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Transaction response.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: String,
    /// Transaction kind.
    pub kind: String,
    /// Amount in the smallest currency unit (always positive).
    pub amount: i64,
    /// Transaction status.
    pub status: String,
    /// Order reference, for payments and refunds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_ref: Option<u64>,
    /// Gateway payment-intent id, for deposits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ref: Option<String>,
    /// Balance after this transaction was applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<i64>,
    /// Timestamp.
    pub created_at: String,
}

impl From<&Transaction> for TransactionResponse {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            kind: format!("{:?}", tx.kind).to_lowercase(),
            amount: tx.amount,
            status: format!("{:?}", tx.status).to_lowercase(),
            order_ref: tx.order_ref,
            gateway_ref: tx.gateway_ref.clone(),
            balance_after: tx.balance_after,
            created_at: tx.created_at.to_rfc3339(),
        }
    }
}

/// List transactions response.
#[derive(Debug, Serialize)]
pub struct ListTransactionsResponse {
    /// Transactions (newest first).
    pub transactions: Vec<TransactionResponse>,
    /// Whether there are more transactions.
    pub has_more: bool,
}

/// List the owner's transaction history, newest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let transactions = state
        .wallets
        .transactions(&auth.owner_id, limit + 1, query.offset)?;

    let has_more = transactions.len() > limit;
    let transactions: Vec<_> = transactions
        .iter()
        .take(limit)
        .map(TransactionResponse::from)
        .collect();

    Ok(Json(ListTransactionsResponse {
        transactions,
        has_more,
    }))
}
