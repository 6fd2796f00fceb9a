//! `RocksDB` ledger storage for Paybox.
//!
//! This crate is the single source of truth for wallet balances. It provides
//! persistent storage for wallets, ledger transactions, and refund requests
//! using `RocksDB` with column families for efficient indexing.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `wallets`: Primary wallet records, keyed by `wallet_id`
//! - `wallets_by_owner`: Index mapping `owner_id` to `wallet_id`
//! - `transactions`: Ledger transactions, keyed by `transaction_id` (ULID)
//! - `transactions_by_wallet`: Index for listing transactions per wallet
//! - `transactions_by_gateway_ref`: Idempotency index keyed by intent id
//! - `transactions_by_order`: Index for finding payments/refunds per order
//! - `pending_deposits`: Time-ordered index of unsettled deposit rows
//! - `refund_requests`: Refund requests, keyed by `request_id` (ULID)
//! - `open_refunds_by_order`: The open request per order, if any
//!
//! # Concurrency
//!
//! Every read-modify-write section runs under the store's internal write
//! lock, so balance mutations are linearizable. In addition, `apply_delta`
//! takes the wallet version the caller read and fails with
//! `StoreError::VersionConflict` if the wallet moved since, which lets
//! callers detect interleavings across their own read→write windows and
//! retry.
//!
//! # Example
//!
//! ```no_run
//! use paybox_store::{LedgerStore, RocksLedger};
//! use paybox_core::OwnerId;
//!
//! let store = RocksLedger::open("/tmp/paybox-db").unwrap();
//!
//! // Wallets are created lazily on first access.
//! let owner = OwnerId::generate();
//! let wallet = store.get_or_create_wallet(&owner).unwrap();
//! assert_eq!(wallet.balance, 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksLedger;

use chrono::{DateTime, Utc};
use paybox_core::{
    OwnerId, RefundRequest, RefundRequestId, Transaction, TransactionId, TransactionKind, Wallet,
    WalletId,
};

/// Outcome of a deposit settlement.
#[derive(Debug, Clone)]
pub struct DepositSettlement {
    /// The completed deposit row.
    pub transaction: Transaction,
    /// Whether this call applied the credit. `false` means the deposit was
    /// already settled and the existing row is returned unchanged.
    pub newly_applied: bool,
}

/// The storage trait defining all ledger operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations. All balance mutation goes through `apply_delta` or one
/// of the compound deposit-settlement operations; nothing else may touch a
/// wallet's balance.
pub trait LedgerStore: Send + Sync {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    /// Get the owner's wallet, creating it with zero balance if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_or_create_wallet(&self, owner_id: &OwnerId) -> Result<Wallet>;

    /// Get a wallet by owner ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet(&self, owner_id: &OwnerId) -> Result<Option<Wallet>>;

    /// Get a wallet by wallet ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_wallet_by_id(&self, wallet_id: &WalletId) -> Result<Option<Wallet>>;

    /// Activate or deactivate a wallet (administrative path).
    ///
    /// Bumps the wallet version and `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the wallet doesn't exist.
    fn set_wallet_active(&self, wallet_id: &WalletId, active: bool) -> Result<Wallet>;

    /// Atomically adjust a wallet balance and insert the accompanying ledger
    /// row in one batch.
    ///
    /// The supplied transaction is completed (status, `balance_after`,
    /// `updated_at`) as part of the write. Positive deltas credit, negative
    /// deltas debit.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the wallet doesn't exist.
    /// - `StoreError::WalletInactive` if the wallet is deactivated.
    /// - `StoreError::VersionConflict` if the wallet was mutated since
    ///   `expected_version` was read.
    /// - `StoreError::InsufficientFunds` if the balance would go negative.
    ///
    /// On any error no mutation is committed.
    fn apply_delta(
        &self,
        wallet_id: &WalletId,
        delta: i64,
        expected_version: u64,
        tx: Transaction,
    ) -> Result<(Wallet, Transaction)>;

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    /// Insert a ledger transaction without touching any balance.
    ///
    /// Used for `Pending` deposit rows. Maintains the wallet, order,
    /// gateway-ref, and pending indexes. Insert-only: terminal rows are never
    /// mutated through this path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateGatewayRef` if a row already exists for
    /// the transaction's gateway ref.
    fn record_transaction(&self, tx: &Transaction) -> Result<()>;

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>>;

    /// Look up a transaction by its gateway intent id (idempotency key).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_transaction_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Transaction>>;

    /// Find the completed transaction of the given kind for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_completed_by_order(
        &self,
        order_ref: u64,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>>;

    /// List transactions for a wallet, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions(
        &self,
        wallet_id: &WalletId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>>;

    /// List deposit rows still `Pending` that were created before `cutoff`,
    /// oldest first. Used by the reconciliation sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_pending_deposits_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Transaction>>;

    // =========================================================================
    // Deposit Settlement (compound, atomic)
    // =========================================================================

    /// Credit the wallet for a confirmed deposit and complete its row, in one
    /// atomic unit.
    ///
    /// Idempotent: if the row is already `Completed` it is returned unchanged
    /// with `newly_applied = false`. The status check runs inside the same
    /// critical section as the mutation, so two concurrent settlements of the
    /// same intent credit exactly once.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no row exists for the gateway ref.
    /// - `StoreError::DepositNotPending` if the row is `Failed` or
    ///   `Cancelled`.
    /// - `StoreError::WalletInactive` if the wallet is deactivated.
    fn settle_deposit(&self, gateway_ref: &str) -> Result<DepositSettlement>;

    /// Mark a pending deposit `Failed` (gateway rejected the intent).
    ///
    /// Idempotent when the row is already `Failed`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no row exists for the gateway ref.
    /// - `StoreError::DepositNotPending` if the row is `Completed` or
    ///   `Cancelled`.
    fn fail_deposit(&self, gateway_ref: &str) -> Result<Transaction>;

    /// Mark a pending deposit `Cancelled` (intent expired unconfirmed).
    ///
    /// Idempotent when the row is already `Cancelled`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if no row exists for the gateway ref.
    /// - `StoreError::DepositNotPending` if the row is `Completed` or
    ///   `Failed`.
    fn expire_deposit(&self, gateway_ref: &str) -> Result<Transaction>;

    // =========================================================================
    // Refund Request Operations
    // =========================================================================

    /// Insert an open refund request and claim the order's open slot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateRefundRequest` if an open request
    /// already exists for the order.
    fn put_refund_request(&self, request: &RefundRequest) -> Result<()>;

    /// Get a refund request by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_refund_request(&self, request_id: &RefundRequestId) -> Result<Option<RefundRequest>>;

    /// Find the open refund request for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_open_refund_by_order(&self, order_ref: u64) -> Result<Option<RefundRequest>>;

    /// Resolve an open refund request, releasing the order's open slot.
    ///
    /// The open-check runs inside the critical section, so a request resolves
    /// exactly once.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request doesn't exist.
    /// - `StoreError::RefundRequestNotOpen` if it was already resolved.
    fn resolve_refund_request(
        &self,
        request_id: &RefundRequestId,
        approved: bool,
        resolved_by: &OwnerId,
    ) -> Result<RefundRequest>;
}
