//! HTTP request handlers.

pub mod admin;
pub mod deposits;
pub mod health;
pub mod payments;
pub mod refunds;
pub mod wallet;
pub mod webhooks;
