//! Error types for Paybox storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in ledger storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind.
        entity: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// A debit would take the balance negative.
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

    /// The wallet version moved since it was read (optimistic-lock conflict).
    #[error("version conflict on wallet {wallet_id}: expected {expected}, found {found}")]
    VersionConflict {
        /// The contended wallet.
        wallet_id: String,
        /// The version the caller read.
        expected: u64,
        /// The version currently stored.
        found: u64,
    },

    /// A transaction with this gateway ref already exists.
    #[error("duplicate gateway ref: {gateway_ref}")]
    DuplicateGatewayRef {
        /// The duplicated intent id.
        gateway_ref: String,
    },

    /// The deposit is already in a terminal status that conflicts with the
    /// requested transition.
    #[error("deposit {gateway_ref} is not pending (status: {status})")]
    DepositNotPending {
        /// The intent id.
        gateway_ref: String,
        /// The terminal status the row is in.
        status: String,
    },

    /// An open refund request already exists for the order.
    #[error("open refund request already exists for order {order_ref}")]
    DuplicateRefundRequest {
        /// The order with the open request.
        order_ref: u64,
    },

    /// The refund request has already been resolved.
    #[error("refund request not open: {request_id}")]
    RefundRequestNotOpen {
        /// The resolved request.
        request_id: String,
    },
}

impl From<StoreError> for paybox_core::PayboxError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Storage(msg),
            StoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            StoreError::InsufficientFunds { balance, required } => {
                Self::InsufficientFunds { balance, required }
            }
            StoreError::WalletInactive { wallet_id } => Self::WalletInactive { wallet_id },
            StoreError::VersionConflict { wallet_id, .. } => {
                Self::ConcurrentModification { wallet_id }
            }
            StoreError::DuplicateGatewayRef { gateway_ref } => {
                Self::Storage(format!("duplicate gateway ref: {gateway_ref}"))
            }
            StoreError::DepositNotPending { gateway_ref, .. } => Self::DepositFailed {
                intent_id: gateway_ref,
            },
            StoreError::DuplicateRefundRequest { order_ref } => {
                Self::DuplicateRefundRequest { order_ref }
            }
            StoreError::RefundRequestNotOpen { request_id } => {
                Self::RefundRequestNotOpen { request_id }
            }
        }
    }
}
