//! Core types and utilities for Paybox.
//!
//! This crate provides the foundational types used throughout the Paybox
//! wallet ledger:
//!
//! - **Identifiers**: `OwnerId`, `WalletId`, `TransactionId`, `RefundRequestId`
//! - **Wallets**: `Wallet`, the per-owner stored balance
//! - **Transactions**: `Transaction`, `TransactionKind`, `TransactionStatus`
//! - **Refunds**: `RefundRequest`
//!
//! # Amounts
//!
//! All amounts are `i64` in the smallest currency unit (no fractional units,
//! no floating point). A wallet balance is never negative.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ids;
pub mod refund;
pub mod transaction;
pub mod wallet;

pub use error::{PayboxError, Result};
pub use ids::{IdError, OwnerId, RefundRequestId, TransactionId, WalletId};
pub use refund::RefundRequest;
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use wallet::{Wallet, MAX_DEPOSIT_AMOUNT, MIN_DEPOSIT_AMOUNT};
