//! Background reconciliation of stale deposit intents.
//!
//! A deposit whose confirmation call was lost stays `Pending` forever
//! unless something re-checks it. The reconciliation job periodically
//! re-queries the gateway for deposits pending longer than the timeout and
//! drives the same idempotent settle/fail transitions the confirmation
//! path uses, so a late client confirm and the sweep can race safely.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use paybox_core::PayboxError;
use paybox_gateway::{IntentStatus, PaymentGateway};
use paybox_store::{LedgerStore, StoreError};

/// Counters from one reconciliation sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepStats {
    /// Deposits credited because the gateway reported success.
    pub settled: usize,
    /// Deposits marked failed because the gateway rejected them.
    pub failed: usize,
    /// Deposits cancelled after exceeding the expiry window.
    pub expired: usize,
    /// Deposits left pending (still unsettled, or gateway unreachable).
    pub skipped: usize,
}

/// Periodically resolves deposit intents left pending past the timeout.
pub struct ReconciliationJob {
    store: Arc<dyn LedgerStore>,
    gateway: Arc<dyn PaymentGateway>,
    interval: Duration,
    pending_timeout: chrono::Duration,
    pending_expiry: chrono::Duration,
}

impl ReconciliationJob {
    /// Create a new reconciliation job.
    ///
    /// `pending_timeout` is how long a deposit may sit pending before the
    /// sweep re-queries it; `pending_expiry` is how long before a
    /// still-unsettled intent is cancelled.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        gateway: Arc<dyn PaymentGateway>,
        interval: Duration,
        pending_timeout: Duration,
        pending_expiry: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            interval,
            pending_timeout: chrono::Duration::from_std(pending_timeout)
                .unwrap_or_else(|_| chrono::Duration::minutes(30)),
            pending_expiry: chrono::Duration::from_std(pending_expiry)
                .unwrap_or_else(|_| chrono::Duration::hours(24)),
        }
    }

    /// Spawn the job on the current tokio runtime.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it so a fresh service
            // doesn't sweep before it has finished starting.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match self.sweep().await {
                    Ok(stats) if stats != SweepStats::default() => {
                        tracing::info!(
                            settled = %stats.settled,
                            failed = %stats.failed,
                            expired = %stats.expired,
                            skipped = %stats.skipped,
                            "Reconciliation sweep finished"
                        );
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Reconciliation sweep failed");
                    }
                }
            }
        })
    }

    /// Run one sweep over deposits pending longer than the timeout.
    ///
    /// A gateway error on one deposit is logged and skipped; the sweep
    /// continues with the rest.
    ///
    /// # Errors
    ///
    /// Returns an error only if the ledger itself fails.
    pub async fn sweep(&self) -> Result<SweepStats, PayboxError> {
        let now = Utc::now();
        let stale = self
            .store
            .list_pending_deposits_before(now - self.pending_timeout)?;

        let mut stats = SweepStats::default();

        for tx in stale {
            let Some(intent_id) = tx.gateway_ref.clone() else {
                // Pending deposits always carry a gateway ref; a row without
                // one cannot be reconciled.
                tracing::warn!(transaction_id = %tx.id, "Pending deposit without gateway ref");
                stats.skipped += 1;
                continue;
            };

            let state = match self.gateway.get_intent_status(&intent_id).await {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        intent_id = %intent_id,
                        error = %e,
                        "Gateway unreachable during reconciliation"
                    );
                    stats.skipped += 1;
                    continue;
                }
            };

            match state.status {
                IntentStatus::Succeeded => match self.store.settle_deposit(&intent_id) {
                    Ok(settlement) if settlement.newly_applied => {
                        tracing::info!(intent_id = %intent_id, "Reconciliation settled deposit");
                        stats.settled += 1;
                    }
                    Ok(_) => {}
                    Err(e) => skip_row_error(e, &intent_id, &mut stats)?,
                },
                IntentStatus::Failed => match self.store.fail_deposit(&intent_id) {
                    Ok(_) => {
                        tracing::info!(intent_id = %intent_id, "Reconciliation failed deposit");
                        stats.failed += 1;
                    }
                    Err(e) => skip_row_error(e, &intent_id, &mut stats)?,
                },
                IntentStatus::Pending => {
                    if tx.created_at < now - self.pending_expiry {
                        match self.store.expire_deposit(&intent_id) {
                            Ok(_) => {
                                tracing::info!(
                                    intent_id = %intent_id,
                                    "Reconciliation expired deposit"
                                );
                                stats.expired += 1;
                            }
                            Err(e) => skip_row_error(e, &intent_id, &mut stats)?,
                        }
                    } else {
                        stats.skipped += 1;
                    }
                }
            }
        }

        Ok(stats)
    }
}

/// Classifies a store error hit while resolving one deposit row.
///
/// Only database-level failures abort the sweep. Row-specific errors (a
/// racing confirmation already moved the row, an inactive wallet rejects
/// the credit) are counted as skipped and the row stays pending for a
/// later sweep.
fn skip_row_error(
    error: StoreError,
    intent_id: &str,
    stats: &mut SweepStats,
) -> Result<(), PayboxError> {
    match error {
        StoreError::Database(_) | StoreError::Serialization(_) => Err(error.into()),
        StoreError::DepositNotPending { .. } => {
            stats.skipped += 1;
            Ok(())
        }
        other => {
            tracing::warn!(
                intent_id = %intent_id,
                error = %other,
                "Deposit left pending by reconciliation"
            );
            stats.skipped += 1;
            Ok(())
        }
    }
}
