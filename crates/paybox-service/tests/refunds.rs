//! Refund workflow integration tests.

mod common;

use common::TestHarness;
use paybox_core::PayboxError;
use serde_json::json;

async fn pay_order(harness: &TestHarness, order_ref: u64, amount: i64) {
    harness
        .server
        .post("/v1/wallet/payment")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": order_ref, "amount": amount }))
        .await
        .assert_status_ok();
}

async fn open_refund(harness: &TestHarness, order_ref: u64) -> String {
    let response = harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": order_ref, "reason": "item damaged" }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

async fn resolve(
    harness: &TestHarness,
    request_id: &str,
    approved: bool,
) -> axum_test::TestResponse {
    harness
        .server
        .post(&format!("/v1/refunds/{request_id}/resolve"))
        .add_header("x-api-key", harness.approver_api_key.clone())
        .add_header("x-approver-id", harness.approver_id.to_string())
        .json(&json!({ "approved": approved }))
        .await
}

// ============================================================================
// Requesting
// ============================================================================

#[tokio::test]
async fn refund_approval_restores_original_amount() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;
    assert_eq!(harness.balance().await, 40_000);

    let request_id = open_refund(&harness, 42).await;
    let response = resolve(&harness, &request_id, true).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["approved"], true);
    assert_eq!(body["resolved_by"], harness.approver_id.to_string());
    assert!(body["resolved_at"].is_string());

    assert_eq!(harness.balance().await, 100_000);

    // History shows the refund on top of the payment.
    let response = harness
        .server
        .get("/v1/wallet/transactions")
        .add_header("authorization", harness.owner_auth_header())
        .await;
    let body: serde_json::Value = response.json();
    let transactions = body["transactions"].as_array().unwrap();
    assert_eq!(transactions[0]["kind"], "refund");
    assert_eq!(transactions[0]["amount"], 60_000);
    assert_eq!(transactions[1]["kind"], "payment");
}

#[tokio::test]
async fn refund_for_unpaid_order_conflict() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": 999, "reason": "never bought this" }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn refund_by_non_payer_not_found() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", TestHarness::other_owner_auth_header())
        .json(&json!({ "order_ref": 42, "reason": "not mine" }))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn refund_with_empty_reason_rejected() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": 42, "reason": "  " }))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn duplicate_open_request_conflict() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;
    open_refund(&harness, 42).await;

    harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": 42, "reason": "asking again" }))
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn denial_leaves_balance_untouched() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    let request_id = open_refund(&harness, 42).await;
    let response = resolve(&harness, &request_id, false).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["approved"], false);

    assert_eq!(harness.balance().await, 40_000);
}

#[tokio::test]
async fn denied_order_can_be_requested_again() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    let request_id = open_refund(&harness, 42).await;
    resolve(&harness, &request_id, false).await.assert_status_ok();

    // The open slot is freed on denial.
    open_refund(&harness, 42).await;
}

#[tokio::test]
async fn resolving_twice_conflicts() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    let request_id = open_refund(&harness, 42).await;
    resolve(&harness, &request_id, true).await.assert_status_ok();

    resolve(&harness, &request_id, true)
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);
    assert_eq!(harness.balance().await, 100_000);
}

#[tokio::test]
async fn refunded_order_cannot_be_requested_again() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    let request_id = open_refund(&harness, 42).await;
    resolve(&harness, &request_id, true).await.assert_status_ok();

    harness
        .server
        .post("/v1/refunds")
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "order_ref": 42, "reason": "double dipping" }))
        .await
        .assert_status(axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn concurrent_resolutions_credit_once() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;

    let request_id = open_refund(&harness, 42).await;
    let request_id: paybox_core::RefundRequestId = request_id.parse().unwrap();
    let approver_id = harness.approver_id;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let refunds = harness.state.refunds.clone();
        handles.push(std::thread::spawn(move || {
            refunds.resolve_refund(&request_id, &approver_id, true)
        }));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(
            result,
            Err(PayboxError::RefundRequestNotOpen { .. })
        ));
    }

    assert_eq!(harness.balance().await, 100_000);
}

// ============================================================================
// Approver auth
// ============================================================================

#[tokio::test]
async fn resolution_requires_approver_credentials() {
    let harness = TestHarness::new();

    harness.deposit(100_000).await;
    pay_order(&harness, 42, 60_000).await;
    let request_id = open_refund(&harness, 42).await;

    // No credentials at all.
    harness
        .server
        .post(&format!("/v1/refunds/{request_id}/resolve"))
        .json(&json!({ "approved": true }))
        .await
        .assert_status_unauthorized();

    // Wrong API key.
    harness
        .server
        .post(&format!("/v1/refunds/{request_id}/resolve"))
        .add_header("x-api-key", "wrong-key")
        .add_header("x-approver-id", harness.approver_id.to_string())
        .json(&json!({ "approved": true }))
        .await
        .assert_status_unauthorized();

    // Valid key but no approver identity.
    harness
        .server
        .post(&format!("/v1/refunds/{request_id}/resolve"))
        .add_header("x-api-key", harness.approver_api_key.clone())
        .json(&json!({ "approved": true }))
        .await
        .assert_status_unauthorized();

    // Owner bearer tokens do not grant approver powers.
    harness
        .server
        .post(&format!("/v1/refunds/{request_id}/resolve"))
        .add_header("authorization", harness.owner_auth_header())
        .json(&json!({ "approved": true }))
        .await
        .assert_status_unauthorized();

    assert_eq!(harness.balance().await, 40_000);
}
