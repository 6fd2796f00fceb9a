//! Refund request types for Paybox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OwnerId, RefundRequestId};

/// A two-party refund request against a paid order.
///
/// Created by the order owner with `approved == None` (open); resolved
/// exactly once by an approver. Approval triggers a refund credit on the
/// ledger; denial has no ledger effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    /// Unique request ID (ULID for time-ordering).
    pub id: RefundRequestId,

    /// The order to refund.
    pub order_ref: u64,

    /// Who asked for the refund.
    pub requester_id: OwnerId,

    /// Why the refund was requested.
    pub reason: String,

    /// `None` while open; `Some(true)` approved, `Some(false)` denied.
    pub approved: Option<bool>,

    /// The approver that resolved the request, once resolved.
    pub resolved_by: Option<OwnerId>,

    /// When the request was created.
    pub created_at: DateTime<Utc>,

    /// When the request was resolved, if it has been.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl RefundRequest {
    /// Create a new open refund request.
    #[must_use]
    pub fn new(requester_id: OwnerId, order_ref: u64, reason: String) -> Self {
        Self {
            id: RefundRequestId::generate(),
            order_ref,
            requester_id,
            reason,
            approved: None,
            resolved_by: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    /// Check whether the request is still open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.approved.is_none()
    }
}
