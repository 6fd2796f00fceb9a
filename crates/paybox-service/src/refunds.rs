//! Refund workflow: two-party approval that credits the ledger.
//!
//! Requests are created by the owner of the paying wallet and resolved
//! exactly once by an approver. Only approval touches the ledger, and the
//! credit always matches the order's original paid amount.

use std::sync::{Arc, Mutex};

use paybox_core::{OwnerId, PayboxError, RefundRequest, RefundRequestId, TransactionKind};
use paybox_store::LedgerStore;

use crate::wallet::WalletService;

/// Result type for refund workflow operations.
pub type Result<T> = std::result::Result<T, PayboxError>;

/// Manages refund requests and drives approved credits through the wallet
/// service.
pub struct RefundWorkflow {
    store: Arc<dyn LedgerStore>,
    wallets: Arc<WalletService>,
    /// Serializes resolutions so the open-check, the ledger credit, and the
    /// resolved marker form one critical section. Without it, two
    /// concurrent approvals could both pass the open-check and credit
    /// twice before either marks the request resolved.
    resolve_lock: Mutex<()>,
}

impl RefundWorkflow {
    /// Create a new refund workflow.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, wallets: Arc<WalletService>) -> Self {
        Self {
            store,
            wallets,
            resolve_lock: Mutex::new(()),
        }
    }

    /// Open a refund request for a paid order.
    ///
    /// # Errors
    ///
    /// - `PayboxError::OrderNotPaid` if the order has no completed payment.
    /// - `PayboxError::NotFound` if the requester does not own the paying
    ///   wallet.
    /// - `PayboxError::AlreadyRefunded` if the order already has a completed
    ///   refund.
    /// - `PayboxError::DuplicateRefundRequest` if an open request exists.
    pub fn request_refund(
        &self,
        requester_id: &OwnerId,
        order_ref: u64,
        reason: String,
    ) -> Result<RefundRequest> {
        let payment = self
            .store
            .find_completed_by_order(order_ref, TransactionKind::Payment)?
            .ok_or(PayboxError::OrderNotPaid { order_ref })?;

        // Only the owner of the paying wallet may ask; others see the order
        // as unknown.
        let requester_wallet = self.store.get_wallet(requester_id)?;
        if requester_wallet.map(|w| w.id) != Some(payment.wallet_id) {
            return Err(PayboxError::NotFound {
                entity: "order",
                id: order_ref.to_string(),
            });
        }

        if self
            .store
            .find_completed_by_order(order_ref, TransactionKind::Refund)?
            .is_some()
        {
            return Err(PayboxError::AlreadyRefunded { order_ref });
        }

        let request = RefundRequest::new(*requester_id, order_ref, reason);
        self.store.put_refund_request(&request)?;

        tracing::info!(
            requester_id = %requester_id,
            order_ref = %order_ref,
            request_id = %request.id,
            "Refund requested"
        );

        Ok(request)
    }

    /// Resolve an open refund request.
    ///
    /// On approval the order's original paid amount is credited before the
    /// request is marked resolved; a failed credit leaves the request open.
    /// Denial resolves with no ledger effect. Safe to invoke concurrently:
    /// exactly one resolution wins, the rest get
    /// `PayboxError::RefundRequestNotOpen`.
    pub fn resolve_refund(
        &self,
        request_id: &RefundRequestId,
        approver_id: &OwnerId,
        approved: bool,
    ) -> Result<RefundRequest> {
        let _guard = self.resolve_lock.lock().unwrap_or_else(|e| e.into_inner());

        let request =
            self.store
                .get_refund_request(request_id)?
                .ok_or_else(|| PayboxError::NotFound {
                    entity: "refund request",
                    id: request_id.to_string(),
                })?;

        if !request.is_open() {
            return Err(PayboxError::RefundRequestNotOpen {
                request_id: request_id.to_string(),
            });
        }

        if approved {
            let payment = self
                .store
                .find_completed_by_order(request.order_ref, TransactionKind::Payment)?
                .ok_or(PayboxError::OrderNotPaid {
                    order_ref: request.order_ref,
                })?;

            let wallet = self.store.get_wallet_by_id(&payment.wallet_id)?.ok_or_else(|| {
                PayboxError::NotFound {
                    entity: "wallet",
                    id: payment.wallet_id.to_string(),
                }
            })?;

            // Credit first; if this fails the request stays open.
            self.wallets
                .credit_refund(&wallet.owner_id, request.order_ref, payment.amount)?;
        }

        let resolved = self
            .store
            .resolve_refund_request(request_id, approved, approver_id)?;

        tracing::info!(
            request_id = %request_id,
            approver_id = %approver_id,
            approved = %approved,
            order_ref = %resolved.order_ref,
            "Refund request resolved"
        );

        Ok(resolved)
    }
}
