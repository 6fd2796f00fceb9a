//! Key encoding utilities for `RocksDB`.
//!
//! This module provides functions for encoding and decoding keys used in
//! column families. All composite keys use fixed-width segments so prefix
//! scans and lexicographic ordering behave predictably.

use paybox_core::{OwnerId, RefundRequestId, TransactionId, WalletId};

/// Create a wallet key from a wallet ID.
#[must_use]
pub fn wallet_key(wallet_id: &WalletId) -> Vec<u8> {
    wallet_id.as_bytes().to_vec()
}

/// Create an owner-index key from an owner ID.
#[must_use]
pub fn owner_key(owner_id: &OwnerId) -> Vec<u8> {
    owner_id.as_bytes().to_vec()
}

/// Create a transaction key from a transaction ID.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Create a wallet-transaction index key.
///
/// Format: `wallet_id (16 bytes) || transaction_id (16 bytes)`
///
/// Since ULIDs are time-ordered, transactions for a wallet are sorted by
/// creation time.
#[must_use]
pub fn wallet_transaction_key(wallet_id: &WalletId, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(wallet_id.as_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for a wallet.
#[must_use]
pub fn wallet_transactions_prefix(wallet_id: &WalletId) -> Vec<u8> {
    wallet_id.as_bytes().to_vec()
}

/// Extract the transaction ID from a wallet-transaction index key.
///
/// # Panics
///
/// Panics if the key is not at least 32 bytes.
#[must_use]
pub fn extract_transaction_id_from_wallet_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TransactionId::from_bytes(bytes)
}

/// Create a gateway-ref index key from an intent id.
#[must_use]
pub fn gateway_ref_key(gateway_ref: &str) -> Vec<u8> {
    gateway_ref.as_bytes().to_vec()
}

/// Create an order-transaction index key.
///
/// Format: `order_ref (8 bytes, big-endian) || transaction_id (16 bytes)`
#[must_use]
pub fn order_transaction_key(order_ref: u64, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(&order_ref.to_be_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Create a prefix for iterating all transactions for an order.
#[must_use]
pub fn order_transactions_prefix(order_ref: u64) -> Vec<u8> {
    order_ref.to_be_bytes().to_vec()
}

/// Extract the transaction ID from an order-transaction index key.
///
/// # Panics
///
/// Panics if the key is not at least 24 bytes.
#[must_use]
pub fn extract_transaction_id_from_order_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[8..24]);
    TransactionId::from_bytes(bytes)
}

/// Create a refund request key from a request ID.
#[must_use]
pub fn refund_request_key(request_id: &RefundRequestId) -> Vec<u8> {
    request_id.to_bytes().to_vec()
}

/// Create an open-refund index key from an order ref.
#[must_use]
pub fn open_refund_key(order_ref: u64) -> Vec<u8> {
    order_ref.to_be_bytes().to_vec()
}
