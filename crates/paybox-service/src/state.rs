//! Application state.

use std::sync::Arc;

use paybox_gateway::PaymentGateway;
use paybox_store::LedgerStore;

use crate::config::ServiceConfig;
use crate::refunds::RefundWorkflow;
use crate::wallet::WalletService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger storage backend.
    pub store: Arc<dyn LedgerStore>,

    /// Wallet service (deposits, payments, refund credits).
    pub wallets: Arc<WalletService>,

    /// Refund approval workflow.
    pub refunds: Arc<RefundWorkflow>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: ServiceConfig,
    ) -> Self {
        let wallets = Arc::new(WalletService::new(
            Arc::clone(&store),
            gateway,
            config.currency.clone(),
        ));
        let refunds = Arc::new(RefundWorkflow::new(Arc::clone(&store), Arc::clone(&wallets)));

        if config.approver_api_key.is_none() {
            tracing::warn!("Approver API key not configured - refund resolution unavailable");
        }

        Self {
            store,
            wallets,
            refunds,
            config,
        }
    }
}
