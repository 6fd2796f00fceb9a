//! Refund request and resolution handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use paybox_core::{RefundRequest, RefundRequestId};

use crate::auth::{ApproverAuth, AuthOwner};
use crate::error::ApiError;
use crate::state::AppState;

/// Refund request response.
#[derive(Debug, Serialize)]
pub struct RefundRequestResponse {
    /// Refund request ID.
    pub id: String,
    /// The order the refund is for.
    pub order_ref: u64,
    /// The requester's stated reason.
    pub reason: String,
    /// Resolution outcome; absent while the request is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    /// Who resolved the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Resolution timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
}

impl From<&RefundRequest> for RefundRequestResponse {
    fn from(request: &RefundRequest) -> Self {
        Self {
            id: request.id.to_string(),
            order_ref: request.order_ref,
            reason: request.reason.clone(),
            approved: request.approved,
            resolved_by: request.resolved_by.map(|id| id.to_string()),
            created_at: request.created_at.to_rfc3339(),
            resolved_at: request.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Open a refund request.
#[derive(Debug, Deserialize)]
pub struct CreateRefundRequest {
    /// The order to refund.
    pub order_ref: u64,
    /// Why the refund is being requested.
    pub reason: String,
}

/// Request a refund for a paid order.
pub async fn request_refund(
    State(state): State<Arc<AppState>>,
    auth: AuthOwner,
    Json(body): Json<CreateRefundRequest>,
) -> Result<Json<RefundRequestResponse>, ApiError> {
    if body.reason.trim().is_empty() {
        return Err(ApiError::BadRequest("Reason must not be empty".into()));
    }

    let request = state
        .refunds
        .request_refund(&auth.owner_id, body.order_ref, body.reason)?;

    Ok(Json(RefundRequestResponse::from(&request)))
}

/// Resolve a refund request.
#[derive(Debug, Deserialize)]
pub struct ResolveRefundRequest {
    /// `true` to approve and credit, `false` to deny.
    pub approved: bool,
}

/// Approve or deny a refund request (approver only).
pub async fn resolve_refund(
    State(state): State<Arc<AppState>>,
    auth: ApproverAuth,
    Path(request_id): Path<String>,
    Json(body): Json<ResolveRefundRequest>,
) -> Result<Json<RefundRequestResponse>, ApiError> {
    let request_id = request_id
        .parse::<RefundRequestId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid refund request id: {request_id}")))?;

    let resolved = state
        .refunds
        .resolve_refund(&request_id, &auth.approver_id, body.approved)?;

    Ok(Json(RefundRequestResponse::from(&resolved)))
}
