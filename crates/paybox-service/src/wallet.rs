//! Wallet service: the single writer for wallet balances.
//!
//! Deposits are a two-phase flow against the external gateway (create an
//! intent, confirm it later); payments and refund credits are synchronous
//! against the ledger. Every balance change goes through the store's
//! `apply_delta` or deposit-settlement operations.

use std::sync::Arc;

use paybox_core::{
    wallet::deposit_amount_in_bounds, OwnerId, PayboxError, Transaction, TransactionStatus, Wallet,
    MAX_DEPOSIT_AMOUNT, MIN_DEPOSIT_AMOUNT,
};
use paybox_gateway::{IntentStatus, PaymentGateway, PaymentIntent};
use paybox_store::{LedgerStore, StoreError};

/// Result type for wallet service operations.
pub type Result<T> = std::result::Result<T, PayboxError>;

/// How many times an optimistic-lock conflict is retried before the
/// operation is surfaced as a transient failure.
const MAX_CONFLICT_RETRIES: usize = 3;

/// Orchestrates deposits, payments, and refund credits against the ledger.
///
/// Gateway round-trips never overlap a ledger critical section: the store
/// lock is taken only for the final local mutation, after the gateway call
/// completes.
pub struct WalletService {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl WalletService {
    /// Create a new wallet service.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            currency: currency.into(),
        }
    }

    /// Get the owner's wallet, creating it on first access.
    pub fn wallet(&self, owner_id: &OwnerId) -> Result<Wallet> {
        Ok(self.store.get_or_create_wallet(owner_id)?)
    }

    /// List the owner's transactions, newest first.
    pub fn transactions(
        &self,
        owner_id: &OwnerId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        let wallet = self.store.get_or_create_wallet(owner_id)?;
        Ok(self.store.list_transactions(&wallet.id, limit, offset)?)
    }

    /// Activate or deactivate the owner's wallet (administrative path).
    pub fn set_wallet_active(&self, owner_id: &OwnerId, active: bool) -> Result<Wallet> {
        let wallet = self.store.get_or_create_wallet(owner_id)?;
        let wallet = self.store.set_wallet_active(&wallet.id, active)?;

        tracing::info!(
            owner_id = %owner_id,
            wallet_id = %wallet.id,
            active = %active,
            "Wallet activation changed"
        );

        Ok(wallet)
    }

    /// Start a deposit: ask the gateway for a payment intent and record a
    /// pending ledger row keyed by the intent id.
    ///
    /// No row is written when the gateway call fails, so retrying is
    /// naturally idempotent at the application level.
    pub async fn create_deposit_intent(
        &self,
        owner_id: &OwnerId,
        amount: i64,
    ) -> Result<PaymentIntent> {
        if !deposit_amount_in_bounds(amount) {
            return Err(PayboxError::InvalidAmount {
                amount,
                min: MIN_DEPOSIT_AMOUNT,
                max: MAX_DEPOSIT_AMOUNT,
            });
        }

        let wallet = self.store.get_or_create_wallet(owner_id)?;
        if !wallet.is_active {
            return Err(PayboxError::WalletInactive {
                wallet_id: wallet.id.to_string(),
            });
        }

        let intent = self
            .gateway
            .create_intent(amount, &self.currency)
            .await
            .map_err(|e| {
                tracing::warn!(owner_id = %owner_id, error = %e, "Gateway intent creation failed");
                PayboxError::GatewayUnavailable(e.to_string())
            })?;

        let tx = Transaction::pending_deposit(wallet.id, amount, intent.intent_id.clone());
        self.store.record_transaction(&tx)?;

        tracing::info!(
            owner_id = %owner_id,
            wallet_id = %wallet.id,
            amount = %amount,
            intent_id = %intent.intent_id,
            "Deposit intent created"
        );

        Ok(intent)
    }

    /// Confirm a deposit: verify the intent with the gateway and credit the
    /// wallet exactly once.
    ///
    /// Idempotent: a deposit that is already settled is returned unchanged
    /// without a second credit and without a gateway round-trip. The
    /// status re-check inside the store's settlement keeps two concurrent
    /// confirmations from crediting twice.
    pub async fn confirm_deposit(
        &self,
        owner_id: &OwnerId,
        intent_id: &str,
    ) -> Result<Transaction> {
        let wallet = self.store.get_or_create_wallet(owner_id)?;
        let tx = self
            .store
            .find_transaction_by_gateway_ref(intent_id)?
            // An intent belonging to another wallet is reported as unknown.
            .filter(|tx| tx.wallet_id == wallet.id)
            .ok_or_else(|| PayboxError::NotFound {
                entity: "deposit",
                id: intent_id.to_string(),
            })?;

        if tx.status == TransactionStatus::Completed {
            return Ok(tx);
        }

        // Gateway round-trip happens outside any ledger lock.
        let state = self
            .gateway
            .get_intent_status(intent_id)
            .await
            .map_err(|e| {
                tracing::warn!(intent_id = %intent_id, error = %e, "Gateway status query failed");
                PayboxError::GatewayUnavailable(e.to_string())
            })?;

        match state.status {
            IntentStatus::Succeeded => {
                let settlement = self.store.settle_deposit(intent_id)?;
                if settlement.newly_applied {
                    tracing::info!(
                        owner_id = %owner_id,
                        intent_id = %intent_id,
                        amount = %settlement.transaction.amount,
                        "Deposit credited"
                    );
                }
                Ok(settlement.transaction)
            }
            IntentStatus::Failed => {
                self.store.fail_deposit(intent_id)?;
                tracing::info!(owner_id = %owner_id, intent_id = %intent_id, "Deposit failed");
                Err(PayboxError::DepositFailed {
                    intent_id: intent_id.to_string(),
                })
            }
            // Still unsettled at the gateway; the row stays pending and the
            // reconciliation job owns expiry.
            IntentStatus::Pending => Err(PayboxError::DepositNotSettled {
                intent_id: intent_id.to_string(),
            }),
        }
    }

    /// Pay for an order from the wallet balance. All-or-nothing: on any
    /// error the balance and the ledger are untouched.
    pub fn pay_with_wallet(
        &self,
        owner_id: &OwnerId,
        order_ref: u64,
        amount: i64,
    ) -> Result<Transaction> {
        if amount <= 0 {
            return Err(PayboxError::InvalidAmount {
                amount,
                min: 1,
                max: i64::MAX,
            });
        }

        let wallet = self.store.get_or_create_wallet(owner_id)?;
        if !wallet.is_active {
            return Err(PayboxError::WalletInactive {
                wallet_id: wallet.id.to_string(),
            });
        }

        let tx = self.apply_with_retry(wallet, -amount, |wallet_id| {
            Transaction::payment(wallet_id, amount, order_ref)
        })?;

        tracing::info!(
            owner_id = %owner_id,
            order_ref = %order_ref,
            amount = %amount,
            balance_after = ?tx.balance_after,
            "Payment recorded"
        );

        Ok(tx)
    }

    /// Credit a refund for an order. Called only by the refund workflow on
    /// approval; the amount is the order's original paid amount, validated
    /// by the caller.
    pub fn credit_refund(
        &self,
        owner_id: &OwnerId,
        order_ref: u64,
        amount: i64,
    ) -> Result<Transaction> {
        let wallet = self.store.get_or_create_wallet(owner_id)?;

        let tx = self.apply_with_retry(wallet, amount, |wallet_id| {
            Transaction::refund(wallet_id, amount, order_ref)
        })?;

        tracing::info!(
            owner_id = %owner_id,
            order_ref = %order_ref,
            amount = %amount,
            "Refund credited"
        );

        Ok(tx)
    }

    /// Apply a signed delta with bounded retry on optimistic-lock conflicts.
    ///
    /// Each attempt re-reads the wallet and builds a fresh ledger row, so a
    /// conflicting writer never invalidates the row we insert.
    fn apply_with_retry(
        &self,
        mut wallet: Wallet,
        delta: i64,
        make_tx: impl Fn(paybox_core::WalletId) -> Transaction,
    ) -> Result<Transaction> {
        for attempt in 0..MAX_CONFLICT_RETRIES {
            let tx = make_tx(wallet.id);
            match self.store.apply_delta(&wallet.id, delta, wallet.version, tx) {
                Ok((_, tx)) => return Ok(tx),
                Err(StoreError::VersionConflict { .. }) => {
                    tracing::debug!(
                        wallet_id = %wallet.id,
                        attempt = %attempt,
                        "Version conflict, retrying"
                    );
                    wallet = self
                        .store
                        .get_wallet_by_id(&wallet.id)?
                        .ok_or_else(|| PayboxError::NotFound {
                            entity: "wallet",
                            id: wallet.id.to_string(),
                        })?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PayboxError::ConcurrentModification {
            wallet_id: wallet.id.to_string(),
        })
    }
}
