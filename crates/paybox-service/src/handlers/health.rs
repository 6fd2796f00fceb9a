//! Liveness endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use paybox_core::OwnerId;
use serde::Serialize;

use crate::state::AppState;

/// Health probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"` when the ledger store answers reads, `"degraded"` otherwise.
    pub status: &'static str,
    /// Crate version baked in at build time.
    pub version: &'static str,
}

/// Reports liveness, including a read probe against the ledger store.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    // The nil owner never has a wallet; any non-error answer proves the
    // store is reachable.
    let probe = state.store.get_wallet(&OwnerId::from_bytes([0u8; 16]));
    let status = match probe {
        Ok(_) => "ok",
        Err(error) => {
            tracing::warn!(%error, "health probe failed to read ledger store");
            "degraded"
        }
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
    })
}
