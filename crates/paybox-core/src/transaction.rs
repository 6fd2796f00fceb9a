//! Ledger transaction types for Paybox.
//!
//! Every balance-affecting event is recorded as a `Transaction`. Rows are
//! immutable once they reach a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{TransactionId, WalletId};

/// A ledger entry recording a balance-affecting event.
///
/// Deposits are created `Pending` and settle asynchronously against the
/// payment gateway; payments and refunds are created directly in a terminal
/// status because they do not depend on an external step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID (ULID for time-ordering).
    pub id: TransactionId,

    /// The wallet whose balance this entry affects.
    pub wallet_id: WalletId,

    /// Kind of transaction.
    pub kind: TransactionKind,

    /// Amount in the smallest currency unit. Always positive; the kind
    /// determines the balance direction.
    pub amount: i64,

    /// Current status.
    pub status: TransactionStatus,

    /// Human-readable description.
    pub description: String,

    /// The order this entry relates to, for payments and refunds.
    pub order_ref: Option<u64>,

    /// External payment-intent id; the idempotency key for deposits.
    pub gateway_ref: Option<String>,

    /// Balance snapshot immediately after this entry applied.
    ///
    /// `Some` if and only if `status == Completed`.
    pub balance_after: Option<i64>,

    /// When the entry was created.
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a pending deposit awaiting gateway confirmation.
    #[must_use]
    pub fn pending_deposit(wallet_id: WalletId, amount: i64, gateway_ref: String) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::generate(),
            wallet_id,
            kind: TransactionKind::Deposit,
            amount,
            status: TransactionStatus::Pending,
            description: format!("Deposit of {amount} via payment gateway"),
            order_ref: None,
            gateway_ref: Some(gateway_ref),
            balance_after: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a payment debit for an order.
    ///
    /// The row starts `Pending` and is completed by the ledger store in the
    /// same atomic unit that debits the wallet.
    #[must_use]
    pub fn payment(wallet_id: WalletId, amount: i64, order_ref: u64) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::generate(),
            wallet_id,
            kind: TransactionKind::Payment,
            amount,
            status: TransactionStatus::Pending,
            description: format!("Payment for order {order_ref}"),
            order_ref: Some(order_ref),
            gateway_ref: None,
            balance_after: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a refund credit for an order.
    #[must_use]
    pub fn refund(wallet_id: WalletId, amount: i64, order_ref: u64) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::generate(),
            wallet_id,
            kind: TransactionKind::Refund,
            amount,
            status: TransactionStatus::Pending,
            description: format!("Refund for order {order_ref}"),
            order_ref: Some(order_ref),
            gateway_ref: None,
            balance_after: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the entry is in a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The signed balance delta this entry applies when completed.
    #[must_use]
    pub const fn signed_delta(&self) -> i64 {
        match self.kind {
            TransactionKind::Deposit | TransactionKind::Refund | TransactionKind::Transfer => {
                self.amount
            }
            TransactionKind::Payment => -self.amount,
        }
    }
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds added from the external payment gateway.
    Deposit,

    /// Funds spent on an order.
    Payment,

    /// Funds credited back after refund approval.
    Refund,

    /// Funds received from another wallet.
    Transfer,
}

impl TransactionKind {
    /// Check whether this kind adds funds to the wallet.
    #[must_use]
    pub const fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit | Self::Refund | Self::Transfer)
    }

    /// Check whether this kind removes funds from the wallet.
    #[must_use]
    pub const fn is_debit(&self) -> bool {
        matches!(self, Self::Payment)
    }
}

/// Status of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting external confirmation.
    Pending,

    /// Applied to the wallet balance. Terminal.
    Completed,

    /// Rejected by the gateway. Terminal, no balance effect.
    Failed,

    /// Expired without confirmation. Terminal, no balance effect.
    Cancelled,
}

impl TransactionStatus {
    /// Check whether the status is terminal (immutable once reached).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}
