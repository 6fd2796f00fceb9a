//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary wallet records, keyed by `wallet_id`.
    pub const WALLETS: &str = "wallets";

    /// Index: wallet by owner, keyed by `owner_id`. Value is the wallet id.
    pub const WALLETS_BY_OWNER: &str = "wallets_by_owner";

    /// Ledger transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by wallet, keyed by `wallet_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_WALLET: &str = "transactions_by_wallet";

    /// Index: transaction by gateway intent id, keyed by `gateway_ref`.
    /// Value is the transaction id. This is the idempotency key index.
    pub const TRANSACTIONS_BY_GATEWAY_REF: &str = "transactions_by_gateway_ref";

    /// Index: transactions by order, keyed by `order_ref || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_ORDER: &str = "transactions_by_order";

    /// Index: pending deposits, keyed by `transaction_id` (ULID, so
    /// time-ordered). Value is empty. Entries are removed when the deposit
    /// reaches a terminal status.
    pub const PENDING_DEPOSITS: &str = "pending_deposits";

    /// Refund requests, keyed by `request_id` (ULID).
    pub const REFUND_REQUESTS: &str = "refund_requests";

    /// Index: the open refund request per order, keyed by `order_ref`.
    /// Value is the request id. Removed on resolution.
    pub const OPEN_REFUNDS_BY_ORDER: &str = "open_refunds_by_order";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::WALLETS,
        cf::WALLETS_BY_OWNER,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_WALLET,
        cf::TRANSACTIONS_BY_GATEWAY_REF,
        cf::TRANSACTIONS_BY_ORDER,
        cf::PENDING_DEPOSITS,
        cf::REFUND_REQUESTS,
        cf::OPEN_REFUNDS_BY_ORDER,
    ]
}
