//! Payment gateway adapter for Paybox.
//!
//! The ledger needs exactly two capabilities from the external card-payment
//! provider: create a payment intent, and query its status. Everything else
//! the provider does (card collection, 3-D Secure) happens out-of-band and
//! never touches this crate.
//!
//! The `PaymentGateway` trait is the seam: the wallet service and the
//! reconciliation job are written against it, `HttpGateway` implements it
//! over the provider's REST API, and tests substitute their own
//! implementations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod http;
pub mod types;

pub use error::GatewayError;
pub use http::HttpGateway;
pub use types::{IntentState, IntentStatus, PaymentIntent};

use async_trait::async_trait;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// The external payment provider contract.
///
/// Implementations must be safe to call concurrently; the wallet service
/// never holds a ledger lock across these calls.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// The returned `client_secret` is handed to the caller so it can
    /// complete the payment out-of-band.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or is rejected.
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent>;

    /// Query the current status of a payment intent.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails or the intent is unknown.
    async fn get_intent_status(&self, intent_id: &str) -> Result<IntentState>;
}
