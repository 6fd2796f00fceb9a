//! Gateway wire and domain types.

use serde::{Deserialize, Serialize};

/// A freshly created payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// The provider's intent id. Used as the ledger's idempotency key.
    pub intent_id: String,

    /// Secret the caller needs to complete the payment out-of-band.
    pub client_secret: String,
}

/// The provider-side state of a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentState {
    /// Settlement status.
    pub status: IntentStatus,

    /// The intent amount in the smallest currency unit.
    pub amount: i64,
}

/// Settlement status of a payment intent.
///
/// Providers report many intermediate states; the ledger only cares about
/// three outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Not settled yet (includes all provider intermediate states).
    Pending,

    /// Payment collected; the deposit may be credited.
    Succeeded,

    /// Payment rejected or cancelled at the provider.
    Failed,
}

impl IntentStatus {
    /// Map a provider status string onto the three outcomes the ledger
    /// distinguishes.
    #[must_use]
    pub fn from_provider(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "failed" | "canceled" | "cancelled" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_status_mapping() {
        assert_eq!(IntentStatus::from_provider("succeeded"), IntentStatus::Succeeded);
        assert_eq!(IntentStatus::from_provider("failed"), IntentStatus::Failed);
        assert_eq!(IntentStatus::from_provider("canceled"), IntentStatus::Failed);
        assert_eq!(
            IntentStatus::from_provider("requires_payment_method"),
            IntentStatus::Pending
        );
        assert_eq!(IntentStatus::from_provider("processing"), IntentStatus::Pending);
    }
}
