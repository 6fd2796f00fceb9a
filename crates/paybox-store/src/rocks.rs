//! `RocksDB` ledger implementation.
//!
//! This module provides the `RocksLedger` implementation of the
//! `LedgerStore` trait.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode, Options,
    WriteBatch,
};

use paybox_core::{
    OwnerId, RefundRequest, RefundRequestId, Transaction, TransactionId, TransactionKind,
    TransactionStatus, Wallet, WalletId,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{DepositSettlement, LedgerStore};

/// RocksDB-backed ledger implementation.
///
/// All read-modify-write sections run under `write_lock`, which makes
/// balance mutations linearizable within the process. RocksDB `WriteBatch`
/// gives atomicity of each multi-key write.
pub struct RocksLedger {
    db: Arc<DBWithThreadMode<rocksdb::MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksLedger {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Acquire the store write lock, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Commit a write batch.
    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Read a wallet row by wallet id.
    fn read_wallet(&self, wallet_id: &WalletId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS)?;
        self.db
            .get_cf(&cf, keys::wallet_key(wallet_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    /// Read a wallet row by owner id via the owner index.
    fn read_wallet_by_owner(&self, owner_id: &OwnerId) -> Result<Option<Wallet>> {
        let cf = self.cf(cf::WALLETS_BY_OWNER)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf, keys::owner_key(owner_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let wallet_id = decode_wallet_id(&id_bytes)?;
        self.read_wallet(&wallet_id)
    }

    /// Read a transaction row by gateway ref via the idempotency index.
    fn read_transaction_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Transaction>> {
        let cf = self.cf(cf::TRANSACTIONS_BY_GATEWAY_REF)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf, keys::gateway_ref_key(gateway_ref))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let tx_id = decode_transaction_id(&id_bytes)?;
        self.get_transaction(&tx_id)
    }

    /// Append the wallet row to a batch.
    fn batch_put_wallet(&self, batch: &mut WriteBatch, wallet: &Wallet) -> Result<()> {
        let cf = self.cf(cf::WALLETS)?;
        batch.put_cf(&cf, keys::wallet_key(&wallet.id), Self::serialize(wallet)?);
        Ok(())
    }

    /// Append the transaction row (without indexes) to a batch.
    fn batch_put_transaction(&self, batch: &mut WriteBatch, tx: &Transaction) -> Result<()> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        batch.put_cf(&cf, keys::transaction_key(&tx.id), Self::serialize(tx)?);
        Ok(())
    }

    /// Append the transaction's index entries to a batch.
    fn batch_put_transaction_indexes(
        &self,
        batch: &mut WriteBatch,
        tx: &Transaction,
    ) -> Result<()> {
        let cf_by_wallet = self.cf(cf::TRANSACTIONS_BY_WALLET)?;
        batch.put_cf(
            &cf_by_wallet,
            keys::wallet_transaction_key(&tx.wallet_id, &tx.id),
            [],
        );

        if let Some(order_ref) = tx.order_ref {
            let cf_by_order = self.cf(cf::TRANSACTIONS_BY_ORDER)?;
            batch.put_cf(&cf_by_order, keys::order_transaction_key(order_ref, &tx.id), []);
        }

        if let Some(gateway_ref) = &tx.gateway_ref {
            let cf_by_ref = self.cf(cf::TRANSACTIONS_BY_GATEWAY_REF)?;
            batch.put_cf(&cf_by_ref, keys::gateway_ref_key(gateway_ref), tx.id.to_bytes());
        }

        Ok(())
    }

    /// Transition a pending deposit to a terminal status with no balance
    /// effect. Shared by `fail_deposit` and `expire_deposit`.
    fn terminate_deposit(
        &self,
        gateway_ref: &str,
        target: TransactionStatus,
    ) -> Result<Transaction> {
        let _guard = self.lock();

        let mut tx = self
            .read_transaction_by_gateway_ref(gateway_ref)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "transaction",
                id: gateway_ref.to_string(),
            })?;

        if tx.status == target {
            return Ok(tx);
        }
        if tx.status.is_terminal() {
            return Err(StoreError::DepositNotPending {
                gateway_ref: gateway_ref.to_string(),
                status: format!("{:?}", tx.status).to_lowercase(),
            });
        }

        tx.status = target;
        tx.updated_at = Utc::now();

        let mut batch = WriteBatch::default();
        self.batch_put_transaction(&mut batch, &tx)?;
        let cf_pending = self.cf(cf::PENDING_DEPOSITS)?;
        batch.delete_cf(&cf_pending, keys::transaction_key(&tx.id));
        self.write(batch)?;

        Ok(tx)
    }
}

/// Decode a wallet id stored as a raw index value.
fn decode_wallet_id(bytes: &[u8]) -> Result<WalletId> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| StoreError::Serialization("wallet id index entry malformed".into()))?;
    Ok(WalletId::from_bytes(raw))
}

/// Decode a transaction id stored as a raw index value.
fn decode_transaction_id(bytes: &[u8]) -> Result<TransactionId> {
    let raw: [u8; 16] = bytes
        .try_into()
        .map_err(|_| StoreError::Serialization("transaction id index entry malformed".into()))?;
    Ok(TransactionId::from_bytes(raw))
}

impl LedgerStore for RocksLedger {
    // =========================================================================
    // Wallet Operations
    // =========================================================================

    fn get_or_create_wallet(&self, owner_id: &OwnerId) -> Result<Wallet> {
        let _guard = self.lock();

        if let Some(wallet) = self.read_wallet_by_owner(owner_id)? {
            return Ok(wallet);
        }

        let wallet = Wallet::new(*owner_id);

        let mut batch = WriteBatch::default();
        self.batch_put_wallet(&mut batch, &wallet)?;
        let cf_owner = self.cf(cf::WALLETS_BY_OWNER)?;
        batch.put_cf(&cf_owner, keys::owner_key(owner_id), wallet.id.as_bytes());
        self.write(batch)?;

        tracing::debug!(owner_id = %owner_id, wallet_id = %wallet.id, "Wallet created");

        Ok(wallet)
    }

    fn get_wallet(&self, owner_id: &OwnerId) -> Result<Option<Wallet>> {
        self.read_wallet_by_owner(owner_id)
    }

    fn get_wallet_by_id(&self, wallet_id: &WalletId) -> Result<Option<Wallet>> {
        self.read_wallet(wallet_id)
    }

    fn set_wallet_active(&self, wallet_id: &WalletId, active: bool) -> Result<Wallet> {
        let _guard = self.lock();

        let mut wallet = self.read_wallet(wallet_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "wallet",
            id: wallet_id.to_string(),
        })?;

        // updated_at moves only with an actual state change
        if wallet.is_active == active {
            return Ok(wallet);
        }

        wallet.is_active = active;
        wallet.version += 1;
        wallet.updated_at = Utc::now();

        let mut batch = WriteBatch::default();
        self.batch_put_wallet(&mut batch, &wallet)?;
        self.write(batch)?;

        Ok(wallet)
    }

    fn apply_delta(
        &self,
        wallet_id: &WalletId,
        delta: i64,
        expected_version: u64,
        mut tx: Transaction,
    ) -> Result<(Wallet, Transaction)> {
        let _guard = self.lock();

        let mut wallet = self.read_wallet(wallet_id)?.ok_or_else(|| StoreError::NotFound {
            entity: "wallet",
            id: wallet_id.to_string(),
        })?;

        if !wallet.is_active {
            return Err(StoreError::WalletInactive {
                wallet_id: wallet_id.to_string(),
            });
        }

        if wallet.version != expected_version {
            return Err(StoreError::VersionConflict {
                wallet_id: wallet_id.to_string(),
                expected: expected_version,
                found: wallet.version,
            });
        }

        let new_balance = wallet.balance + delta;
        if new_balance < 0 {
            return Err(StoreError::InsufficientFunds {
                balance: wallet.balance,
                required: -delta,
            });
        }

        let now = Utc::now();
        wallet.balance = new_balance;
        wallet.version += 1;
        wallet.updated_at = now;

        tx.status = TransactionStatus::Completed;
        tx.balance_after = Some(new_balance);
        tx.updated_at = now;

        let mut batch = WriteBatch::default();
        self.batch_put_wallet(&mut batch, &wallet)?;
        self.batch_put_transaction(&mut batch, &tx)?;
        self.batch_put_transaction_indexes(&mut batch, &tx)?;
        self.write(batch)?;

        Ok((wallet, tx))
    }

    // =========================================================================
    // Transaction Operations
    // =========================================================================

    fn record_transaction(&self, tx: &Transaction) -> Result<()> {
        let _guard = self.lock();

        if let Some(gateway_ref) = &tx.gateway_ref {
            if self.read_transaction_by_gateway_ref(gateway_ref)?.is_some() {
                return Err(StoreError::DuplicateGatewayRef {
                    gateway_ref: gateway_ref.clone(),
                });
            }
        }

        let mut batch = WriteBatch::default();
        self.batch_put_transaction(&mut batch, tx)?;
        self.batch_put_transaction_indexes(&mut batch, tx)?;

        if tx.kind == TransactionKind::Deposit && tx.status == TransactionStatus::Pending {
            let cf_pending = self.cf(cf::PENDING_DEPOSITS)?;
            batch.put_cf(&cf_pending, keys::transaction_key(&tx.id), []);
        }

        self.write(batch)?;

        Ok(())
    }

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<Transaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        self.db
            .get_cf(&cf, keys::transaction_key(transaction_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_transaction_by_gateway_ref(&self, gateway_ref: &str) -> Result<Option<Transaction>> {
        self.read_transaction_by_gateway_ref(gateway_ref)
    }

    fn find_completed_by_order(
        &self,
        order_ref: u64,
        kind: TransactionKind,
    ) -> Result<Option<Transaction>> {
        let cf_by_order = self.cf(cf::TRANSACTIONS_BY_ORDER)?;
        let prefix = keys::order_transactions_prefix(order_ref);

        let iter = self.db.iterator_cf(
            &cf_by_order,
            IteratorMode::From(&prefix, Direction::Forward),
        );

        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }

            let tx_id = keys::extract_transaction_id_from_order_key(&key);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                if tx.kind == kind && tx.status == TransactionStatus::Completed {
                    return Ok(Some(tx));
                }
            }
        }

        Ok(None)
    }

    fn list_transactions(
        &self,
        wallet_id: &WalletId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Transaction>> {
        let cf_by_wallet = self.cf(cf::TRANSACTIONS_BY_WALLET)?;
        let prefix = keys::wallet_transactions_prefix(wallet_id);

        // Seek to the wallet's highest possible index key and walk
        // backwards; ULID suffixes are time-ordered, so reverse order is
        // newest-first and the scan touches only offset + limit keys.
        let mut upper = prefix.clone();
        upper.extend_from_slice(&[0xFF; 16]);
        let iter = self
            .db
            .iterator_cf(&cf_by_wallet, IteratorMode::From(&upper, Direction::Reverse));

        let mut transactions = Vec::new();
        let mut skipped = 0usize;
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            if skipped < offset {
                skipped += 1;
                continue;
            }
            if transactions.len() >= limit {
                break;
            }

            let tx_id = keys::extract_transaction_id_from_wallet_key(&key);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    fn list_pending_deposits_before(&self, cutoff: DateTime<Utc>) -> Result<Vec<Transaction>> {
        let cf_pending = self.cf(cf::PENDING_DEPOSITS)?;

        let mut pending = Vec::new();
        for item in self.db.iterator_cf(&cf_pending, IteratorMode::Start) {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let tx_id = decode_transaction_id(&key)?;

            let Some(tx) = self.get_transaction(&tx_id)? else {
                continue;
            };

            // Keys are ULIDs in creation order, so past the cutoff we are done.
            if tx.created_at >= cutoff {
                break;
            }

            if tx.status == TransactionStatus::Pending {
                pending.push(tx);
            }
        }

        Ok(pending)
    }

    // =========================================================================
    // Deposit Settlement
    // =========================================================================

    fn settle_deposit(&self, gateway_ref: &str) -> Result<DepositSettlement> {
        let _guard = self.lock();

        let mut tx = self
            .read_transaction_by_gateway_ref(gateway_ref)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "transaction",
                id: gateway_ref.to_string(),
            })?;

        match tx.status {
            // Already credited; return the existing row unchanged.
            TransactionStatus::Completed => {
                return Ok(DepositSettlement {
                    transaction: tx,
                    newly_applied: false,
                });
            }
            TransactionStatus::Failed | TransactionStatus::Cancelled => {
                return Err(StoreError::DepositNotPending {
                    gateway_ref: gateway_ref.to_string(),
                    status: format!("{:?}", tx.status).to_lowercase(),
                });
            }
            TransactionStatus::Pending => {}
        }

        let mut wallet =
            self.read_wallet(&tx.wallet_id)?.ok_or_else(|| StoreError::NotFound {
                entity: "wallet",
                id: tx.wallet_id.to_string(),
            })?;

        if !wallet.is_active {
            return Err(StoreError::WalletInactive {
                wallet_id: wallet.id.to_string(),
            });
        }

        let now = Utc::now();
        wallet.balance += tx.amount;
        wallet.version += 1;
        wallet.updated_at = now;

        tx.status = TransactionStatus::Completed;
        tx.balance_after = Some(wallet.balance);
        tx.updated_at = now;

        let mut batch = WriteBatch::default();
        self.batch_put_wallet(&mut batch, &wallet)?;
        self.batch_put_transaction(&mut batch, &tx)?;
        let cf_pending = self.cf(cf::PENDING_DEPOSITS)?;
        batch.delete_cf(&cf_pending, keys::transaction_key(&tx.id));
        self.write(batch)?;

        Ok(DepositSettlement {
            transaction: tx,
            newly_applied: true,
        })
    }

    fn fail_deposit(&self, gateway_ref: &str) -> Result<Transaction> {
        self.terminate_deposit(gateway_ref, TransactionStatus::Failed)
    }

    fn expire_deposit(&self, gateway_ref: &str) -> Result<Transaction> {
        self.terminate_deposit(gateway_ref, TransactionStatus::Cancelled)
    }

    // =========================================================================
    // Refund Request Operations
    // =========================================================================

    fn put_refund_request(&self, request: &RefundRequest) -> Result<()> {
        let _guard = self.lock();

        let cf_open = self.cf(cf::OPEN_REFUNDS_BY_ORDER)?;
        let open_key = keys::open_refund_key(request.order_ref);

        let already_open = self
            .db
            .get_cf(&cf_open, &open_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if already_open {
            return Err(StoreError::DuplicateRefundRequest {
                order_ref: request.order_ref,
            });
        }

        let cf_requests = self.cf(cf::REFUND_REQUESTS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_requests,
            keys::refund_request_key(&request.id),
            Self::serialize(request)?,
        );
        batch.put_cf(&cf_open, &open_key, request.id.to_bytes());
        self.write(batch)?;

        Ok(())
    }

    fn get_refund_request(&self, request_id: &RefundRequestId) -> Result<Option<RefundRequest>> {
        let cf = self.cf(cf::REFUND_REQUESTS)?;
        self.db
            .get_cf(&cf, keys::refund_request_key(request_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_open_refund_by_order(&self, order_ref: u64) -> Result<Option<RefundRequest>> {
        let cf_open = self.cf(cf::OPEN_REFUNDS_BY_ORDER)?;
        let Some(id_bytes) = self
            .db
            .get_cf(&cf_open, keys::open_refund_key(order_ref))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let raw: [u8; 16] = id_bytes
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Serialization("refund index entry malformed".into()))?;
        self.get_refund_request(&RefundRequestId::from_bytes(raw))
    }

    fn resolve_refund_request(
        &self,
        request_id: &RefundRequestId,
        approved: bool,
        resolved_by: &OwnerId,
    ) -> Result<RefundRequest> {
        let _guard = self.lock();

        let mut request =
            self.get_refund_request(request_id)?.ok_or_else(|| StoreError::NotFound {
                entity: "refund request",
                id: request_id.to_string(),
            })?;

        if !request.is_open() {
            return Err(StoreError::RefundRequestNotOpen {
                request_id: request_id.to_string(),
            });
        }

        request.approved = Some(approved);
        request.resolved_by = Some(*resolved_by);
        request.resolved_at = Some(Utc::now());

        let cf_requests = self.cf(cf::REFUND_REQUESTS)?;
        let cf_open = self.cf(cf::OPEN_REFUNDS_BY_ORDER)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_requests,
            keys::refund_request_key(&request.id),
            Self::serialize(&request)?,
        );
        batch.delete_cf(&cf_open, keys::open_refund_key(request.order_ref));
        self.write(batch)?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (RocksLedger, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RocksLedger::open(dir.path()).unwrap();
        (store, dir)
    }

    fn funded_wallet(store: &RocksLedger, amount: i64) -> Wallet {
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();
        let deposit = Transaction::pending_deposit(
            wallet.id,
            amount,
            format!("pi_fund_{}", wallet.id),
        );
        store.record_transaction(&deposit).unwrap();
        store
            .settle_deposit(deposit.gateway_ref.as_deref().unwrap())
            .unwrap();
        store.get_wallet_by_id(&wallet.id).unwrap().unwrap()
    }

    #[test]
    fn wallet_created_lazily_once() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();

        let first = store.get_or_create_wallet(&owner).unwrap();
        assert_eq!(first.balance, 0);
        assert!(first.is_active);

        let second = store.get_or_create_wallet(&owner).unwrap();
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn apply_delta_credit_and_debit() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 100_000);

        let payment = Transaction::payment(wallet.id, 60_000, 41);
        let (updated, tx) = store
            .apply_delta(&wallet.id, -60_000, wallet.version, payment)
            .unwrap();

        assert_eq!(updated.balance, 40_000);
        assert_eq!(updated.version, wallet.version + 1);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(tx.balance_after, Some(40_000));
    }

    #[test]
    fn apply_delta_version_conflict() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 100_000);

        let payment = Transaction::payment(wallet.id, 1_000, 1);
        let result = store.apply_delta(&wallet.id, -1_000, wallet.version + 7, payment);

        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));
        // Nothing committed on the conflict path.
        let unchanged = store.get_wallet_by_id(&wallet.id).unwrap().unwrap();
        assert_eq!(unchanged.balance, 100_000);
    }

    #[test]
    fn apply_delta_insufficient_funds_leaves_no_trace() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 100_000);

        let payment = Transaction::payment(wallet.id, 150_000, 41);
        let result = store.apply_delta(&wallet.id, -150_000, wallet.version, payment);

        assert!(matches!(
            result,
            Err(StoreError::InsufficientFunds {
                balance: 100_000,
                required: 150_000
            })
        ));

        let unchanged = store.get_wallet_by_id(&wallet.id).unwrap().unwrap();
        assert_eq!(unchanged.balance, 100_000);
        assert_eq!(unchanged.version, wallet.version);
        // Only the funding deposit is on the ledger.
        let txs = store.list_transactions(&wallet.id, 10, 0).unwrap();
        assert_eq!(txs.len(), 1);
    }

    #[test]
    fn apply_delta_rejects_inactive_wallet() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 100_000);
        let wallet = store.set_wallet_active(&wallet.id, false).unwrap();

        let payment = Transaction::payment(wallet.id, 1_000, 41);
        let result = store.apply_delta(&wallet.id, -1_000, wallet.version, payment);
        assert!(matches!(result, Err(StoreError::WalletInactive { .. })));
    }

    #[test]
    fn set_wallet_active_is_a_noop_when_unchanged() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();

        let same = store.set_wallet_active(&wallet.id, true).unwrap();
        assert_eq!(same.version, wallet.version);
        assert_eq!(same.updated_at, wallet.updated_at);

        let deactivated = store.set_wallet_active(&wallet.id, false).unwrap();
        assert_eq!(deactivated.version, wallet.version + 1);
        assert!(!deactivated.is_active);
    }

    #[test]
    fn settle_deposit_credits_once() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();

        let deposit = Transaction::pending_deposit(wallet.id, 100_000, "pi_abc".into());
        store.record_transaction(&deposit).unwrap();

        let first = store.settle_deposit("pi_abc").unwrap();
        assert!(first.newly_applied);
        assert_eq!(first.transaction.balance_after, Some(100_000));

        // Second settlement is a no-op returning the same row.
        let second = store.settle_deposit("pi_abc").unwrap();
        assert!(!second.newly_applied);
        assert_eq!(second.transaction.id, first.transaction.id);

        let updated = store.get_wallet_by_id(&wallet.id).unwrap().unwrap();
        assert_eq!(updated.balance, 100_000);
    }

    #[test]
    fn fail_deposit_then_settle_is_rejected() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();

        let deposit = Transaction::pending_deposit(wallet.id, 100_000, "pi_bad".into());
        store.record_transaction(&deposit).unwrap();

        let failed = store.fail_deposit("pi_bad").unwrap();
        assert_eq!(failed.status, TransactionStatus::Failed);
        assert!(failed.balance_after.is_none());

        // Failing again is idempotent.
        store.fail_deposit("pi_bad").unwrap();

        // No transition out of a terminal status.
        let result = store.settle_deposit("pi_bad");
        assert!(matches!(result, Err(StoreError::DepositNotPending { .. })));

        let unchanged = store.get_wallet_by_id(&wallet.id).unwrap().unwrap();
        assert_eq!(unchanged.balance, 0);
    }

    #[test]
    fn duplicate_gateway_ref_rejected() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();

        let first = Transaction::pending_deposit(wallet.id, 100_000, "pi_dup".into());
        store.record_transaction(&first).unwrap();

        let second = Transaction::pending_deposit(wallet.id, 100_000, "pi_dup".into());
        let result = store.record_transaction(&second);
        assert!(matches!(result, Err(StoreError::DuplicateGatewayRef { .. })));
    }

    #[test]
    fn list_transactions_newest_first_with_pagination() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 500_000);

        std::thread::sleep(std::time::Duration::from_millis(2)); // Ensure different ULIDs
        let first = Transaction::payment(wallet.id, 10_000, 1);
        store
            .apply_delta(&wallet.id, -10_000, wallet.version, first)
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2));
        let wallet = store.get_wallet_by_id(&wallet.id).unwrap().unwrap();
        let second = Transaction::payment(wallet.id, 20_000, 2);
        store
            .apply_delta(&wallet.id, -20_000, wallet.version, second)
            .unwrap();

        let all = store.list_transactions(&wallet.id, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].order_ref, Some(2)); // Newest first
        assert_eq!(all[1].order_ref, Some(1));
        assert_eq!(all[2].kind, TransactionKind::Deposit);

        let page = store.list_transactions(&wallet.id, 1, 1).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].order_ref, Some(1));

        let past_the_end = store.list_transactions(&wallet.id, 10, 3).unwrap();
        assert!(past_the_end.is_empty());
    }

    #[test]
    fn list_transactions_stays_within_the_wallet() {
        let (store, _dir) = create_test_store();

        // Interleave rows across two wallets so each wallet's index keys
        // have a neighbor on both sides.
        let first = funded_wallet(&store, 100_000);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = funded_wallet(&store, 200_000);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let first = store.get_wallet_by_id(&first.id).unwrap().unwrap();
        let payment = Transaction::payment(first.id, 10_000, 7);
        store
            .apply_delta(&first.id, -10_000, first.version, payment)
            .unwrap();

        let first_rows = store.list_transactions(&first.id, 10, 0).unwrap();
        assert_eq!(first_rows.len(), 2);
        assert!(first_rows.iter().all(|tx| tx.wallet_id == first.id));

        let second_rows = store.list_transactions(&second.id, 10, 0).unwrap();
        assert_eq!(second_rows.len(), 1);
        assert_eq!(second_rows[0].wallet_id, second.id);
    }

    #[test]
    fn find_completed_by_order() {
        let (store, _dir) = create_test_store();
        let wallet = funded_wallet(&store, 100_000);

        let payment = Transaction::payment(wallet.id, 60_000, 41);
        store
            .apply_delta(&wallet.id, -60_000, wallet.version, payment)
            .unwrap();

        let found = store
            .find_completed_by_order(41, TransactionKind::Payment)
            .unwrap()
            .unwrap();
        assert_eq!(found.amount, 60_000);

        assert!(store
            .find_completed_by_order(41, TransactionKind::Refund)
            .unwrap()
            .is_none());
        assert!(store
            .find_completed_by_order(999, TransactionKind::Payment)
            .unwrap()
            .is_none());
    }

    #[test]
    fn pending_sweep_only_sees_old_unsettled_deposits() {
        let (store, _dir) = create_test_store();
        let owner = OwnerId::generate();
        let wallet = store.get_or_create_wallet(&owner).unwrap();

        let stale = Transaction::pending_deposit(wallet.id, 50_000, "pi_stale".into());
        store.record_transaction(&stale).unwrap();

        let settled = Transaction::pending_deposit(wallet.id, 50_000, "pi_settled".into());
        store.record_transaction(&settled).unwrap();
        store.settle_deposit("pi_settled").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let cutoff = Utc::now();

        let fresh = Transaction::pending_deposit(wallet.id, 50_000, "pi_fresh".into());
        store.record_transaction(&fresh).unwrap();

        let pending = store.list_pending_deposits_before(cutoff).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].gateway_ref.as_deref(), Some("pi_stale"));
    }

    #[test]
    fn refund_request_open_slot_per_order() {
        let (store, _dir) = create_test_store();
        let requester = OwnerId::generate();
        let approver = OwnerId::generate();

        let request = RefundRequest::new(requester, 41, "wrong size".into());
        store.put_refund_request(&request).unwrap();

        // Second open request for the same order is rejected.
        let duplicate = RefundRequest::new(requester, 41, "again".into());
        let result = store.put_refund_request(&duplicate);
        assert!(matches!(
            result,
            Err(StoreError::DuplicateRefundRequest { order_ref: 41 })
        ));

        let resolved = store
            .resolve_refund_request(&request.id, true, &approver)
            .unwrap();
        assert_eq!(resolved.approved, Some(true));
        assert_eq!(resolved.resolved_by, Some(approver));
        assert!(resolved.resolved_at.is_some());

        // Resolution releases the open slot.
        assert!(store.find_open_refund_by_order(41).unwrap().is_none());
        let next = RefundRequest::new(requester, 41, "second round".into());
        store.put_refund_request(&next).unwrap();

        // A resolved request cannot be resolved again.
        let result = store.resolve_refund_request(&request.id, false, &approver);
        assert!(matches!(result, Err(StoreError::RefundRequestNotOpen { .. })));
    }
}
