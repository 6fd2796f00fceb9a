//! Wallet types for Paybox.
//!
//! A wallet is the per-owner stored balance. It is created lazily on first
//! access, never deleted, and only deactivated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OwnerId, WalletId};

/// Minimum deposit amount in the smallest currency unit (inclusive).
pub const MIN_DEPOSIT_AMOUNT: i64 = 10_000;

/// Maximum deposit amount in the smallest currency unit (inclusive).
pub const MAX_DEPOSIT_AMOUNT: i64 = 50_000_000;

/// A per-owner wallet holding a monetary balance.
///
/// The balance is an integer in the smallest currency unit and is never
/// negative. Every balance or activation change bumps `version`, which is
/// the optimistic-concurrency token checked by the ledger store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique wallet ID.
    pub id: WalletId,

    /// The owner of this wallet (one wallet per owner).
    pub owner_id: OwnerId,

    /// Current balance in the smallest currency unit. Never negative.
    pub balance: i64,

    /// Whether the wallet accepts debits and credits.
    ///
    /// An inactive wallet rejects all balance changes until an administrator
    /// reactivates it.
    pub is_active: bool,

    /// Mutation counter, bumped on every balance or activation change.
    pub version: u64,

    /// When the wallet was created.
    pub created_at: DateTime<Utc>,

    /// When the wallet was last updated.
    ///
    /// Moves only alongside a balance or activation change.
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Create a new active wallet with zero balance.
    #[must_use]
    pub fn new(owner_id: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::generate(),
            owner_id,
            balance: 0,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the wallet can cover a debit of `amount`.
    #[must_use]
    pub fn has_sufficient_funds(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

/// Check a deposit amount against the allowed bounds.
#[must_use]
pub fn deposit_amount_in_bounds(amount: i64) -> bool {
    (MIN_DEPOSIT_AMOUNT..=MAX_DEPOSIT_AMOUNT).contains(&amount)
}
