//! Paybox HTTP API Service.
//!
//! This crate provides the wallet ledger's service layer and HTTP API:
//!
//! - `WalletService` - deposits, payments, refund credits (the only
//!   component that mutates balances)
//! - `RefundWorkflow` - two-party refund approval
//! - `ReconciliationJob` - background resolution of stale deposit intents
//! - Axum handlers, router, auth extractors, and webhook verification
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **Owner bearer tokens** - For wallet-owner requests
//! 2. **Approver API key** - For refund resolution and wallet administration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod reconcile;
pub mod refunds;
pub mod routes;
pub mod state;
pub mod wallet;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use reconcile::{ReconciliationJob, SweepStats};
pub use refunds::RefundWorkflow;
pub use routes::create_router;
pub use state::AppState;
pub use wallet::WalletService;
