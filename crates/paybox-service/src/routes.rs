//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, deposits, health, payments, refunds, wallet, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Wallet (owner bearer auth)
/// - `GET /v1/wallet` - Get wallet balance
/// - `GET /v1/wallet/transactions` - List transaction history
/// - `POST /v1/wallet/deposit-intent` - Start a deposit
/// - `POST /v1/wallet/deposit-confirm` - Confirm a deposit
/// - `POST /v1/wallet/payment` - Pay for an order
///
/// ## Refunds
/// - `POST /v1/refunds` - Request a refund (owner auth)
/// - `POST /v1/refunds/:id/resolve` - Resolve a request (approver auth)
///
/// ## Admin (approver auth)
/// - `POST /v1/admin/wallets/:owner_id/active` - Activate/deactivate a wallet
///
/// ## Webhooks (signature verification)
/// - `POST /webhooks/gateway` - Gateway intent state changes
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Wallet
        .route("/v1/wallet", get(wallet::get_wallet))
        .route("/v1/wallet/transactions", get(wallet::list_transactions))
        .route(
            "/v1/wallet/deposit-intent",
            post(deposits::create_deposit_intent),
        )
        .route(
            "/v1/wallet/deposit-confirm",
            post(deposits::confirm_deposit),
        )
        .route("/v1/wallet/payment", post(payments::pay))
        // Refunds
        .route("/v1/refunds", post(refunds::request_refund))
        .route("/v1/refunds/:id/resolve", post(refunds::resolve_refund))
        // Admin
        .route(
            "/v1/admin/wallets/:owner_id/active",
            post(admin::set_wallet_active),
        )
        // Webhooks
        .route("/webhooks/gateway", post(webhooks::gateway_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
