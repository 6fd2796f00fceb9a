//! Error types for Paybox.

use crate::ids::IdError;

/// Result type for Paybox operations.
pub type Result<T> = std::result::Result<T, PayboxError>;

/// Errors that can occur in Paybox ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum PayboxError {
    /// Deposit amount outside the allowed bounds.
    #[error("invalid amount: {amount} (allowed {min}..={max})")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
        /// Minimum allowed amount.
        min: i64,
        /// Maximum allowed amount.
        max: i64,
    },

    /// Balance too low for the requested debit.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance in the smallest currency unit.
        balance: i64,
        /// Required amount in the smallest currency unit.
        required: i64,
    },

    /// The wallet is deactivated and rejects balance changes.
    #[error("wallet inactive: {wallet_id}")]
    WalletInactive {
        /// The inactive wallet.
        wallet_id: String,
    },

    /// The payment gateway call failed or timed out.
    #[error("payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The wallet changed underneath an optimistic update.
    ///
    /// Retried internally by the wallet service; surfaced only after the
    /// retry bound is exhausted.
    #[error("concurrent modification of wallet {wallet_id}")]
    ConcurrentModification {
        /// The contended wallet.
        wallet_id: String,
    },

    /// An open refund request already exists for the order.
    #[error("open refund request already exists for order {order_ref}")]
    DuplicateRefundRequest {
        /// The order with the open request.
        order_ref: u64,
    },

    /// The refund request is not open (already resolved).
    #[error("refund request not open: {request_id}")]
    RefundRequestNotOpen {
        /// The resolved request.
        request_id: String,
    },

    /// The order has no completed payment to refund.
    #[error("order {order_ref} was never paid")]
    OrderNotPaid {
        /// The unpaid order.
        order_ref: u64,
    },

    /// The order already has a completed refund.
    #[error("order {order_ref} was already refunded")]
    AlreadyRefunded {
        /// The refunded order.
        order_ref: u64,
    },

    /// The gateway rejected the deposit intent.
    #[error("deposit failed at the gateway: {intent_id}")]
    DepositFailed {
        /// The failed intent.
        intent_id: String,
    },

    /// The gateway has not settled the deposit intent yet.
    #[error("deposit not settled yet: {intent_id}")]
    DepositNotSettled {
        /// The still-pending intent.
        intent_id: String,
    },

    /// Unknown wallet, transaction, or refund request.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind.
        entity: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}
