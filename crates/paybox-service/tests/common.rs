//! Common test utilities for paybox integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use paybox_core::OwnerId;
use paybox_gateway::{GatewayError, IntentState, IntentStatus, PaymentGateway, PaymentIntent};
use paybox_service::crypto;
use paybox_service::{create_router, AppState, ServiceConfig};
use paybox_store::RocksLedger;

/// A programmable in-process payment gateway.
///
/// Created intents start `Pending`; tests drive them to `Succeeded` or
/// `Failed` with [`MockGateway::set_status`].
pub struct MockGateway {
    intents: Mutex<HashMap<String, IntentState>>,
    counter: AtomicU64,
    unavailable: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            intents: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Move an intent to the given status.
    pub fn set_status(&self, intent_id: &str, status: IntentStatus) {
        let mut intents = self.intents.lock().unwrap();
        let state = intents
            .get_mut(intent_id)
            .unwrap_or_else(|| panic!("unknown test intent: {intent_id}"));
        state.status = status;
    }

    /// Make every gateway call fail until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), GatewayError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                error_type: "api_error".into(),
                message: "gateway offline".into(),
                code: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_intent(
        &self,
        amount: i64,
        _currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        self.check_available()?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let intent_id = format!("pi_test_{n}");

        self.intents.lock().unwrap().insert(
            intent_id.clone(),
            IntentState {
                status: IntentStatus::Pending,
                amount,
            },
        );

        Ok(PaymentIntent {
            client_secret: format!("{intent_id}_secret"),
            intent_id,
        })
    }

    async fn get_intent_status(&self, intent_id: &str) -> Result<IntentState, GatewayError> {
        self.check_available()?;

        self.intents
            .lock()
            .unwrap()
            .get(intent_id)
            .cloned()
            .ok_or_else(|| GatewayError::UnknownIntent {
                intent_id: intent_id.to_string(),
            })
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Application state, for driving services directly in tests.
    pub state: AppState,
    /// The programmable gateway.
    pub gateway: Arc<MockGateway>,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// A test owner ID for authenticated requests.
    pub test_owner_id: OwnerId,
    /// The approver API key.
    pub approver_api_key: String,
    /// A test approver identity.
    pub approver_id: OwnerId,
    /// The gateway webhook signing secret.
    pub webhook_secret: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksLedger::open(temp_dir.path()).expect("Failed to open ledger"));
        let gateway = Arc::new(MockGateway::new());

        let approver_api_key = "test-approver-key".to_string();
        let webhook_secret = "whsec_test".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            gateway_webhook_secret: Some(webhook_secret.clone()),
            approver_api_key: Some(approver_api_key.clone()),
            ..ServiceConfig::default()
        };

        let state = AppState::new(store, gateway.clone(), config);
        let router: Router = create_router(state.clone());

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            state,
            gateway,
            _temp_dir: temp_dir,
            test_owner_id: OwnerId::generate(),
            approver_api_key,
            approver_id: OwnerId::generate(),
            webhook_secret,
        }
    }

    /// Get the authorization header for the test owner.
    pub fn owner_auth_header(&self) -> String {
        format!("Bearer test-token:{}", self.test_owner_id)
    }

    /// Get a different owner's auth header (for testing isolation).
    pub fn other_owner_auth_header() -> String {
        format!("Bearer test-token:{}", OwnerId::generate())
    }

    /// Run a full deposit: create the intent, succeed it at the gateway,
    /// and confirm it. Returns the intent id.
    pub async fn deposit(&self, amount: i64) -> String {
        let response = self
            .server
            .post("/v1/wallet/deposit-intent")
            .add_header("authorization", self.owner_auth_header())
            .json(&serde_json::json!({ "amount": amount }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let intent_id = body["intent_id"].as_str().unwrap().to_string();

        self.gateway.set_status(&intent_id, IntentStatus::Succeeded);

        self.server
            .post("/v1/wallet/deposit-confirm")
            .add_header("authorization", self.owner_auth_header())
            .json(&serde_json::json!({ "intent_id": intent_id }))
            .await
            .assert_status_ok();

        intent_id
    }

    /// Get the test owner's current balance.
    pub async fn balance(&self) -> i64 {
        let response = self
            .server
            .get("/v1/wallet")
            .add_header("authorization", self.owner_auth_header())
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["balance"].as_i64().unwrap()
    }

    /// Build a signed webhook delivery for the given payload.
    pub fn sign_webhook(&self, payload: &str) -> String {
        let timestamp = 1_700_000_000u64;
        let signature =
            crypto::hmac_sha256_hex(&self.webhook_secret, &format!("{timestamp}.{payload}"));
        format!("t={timestamp},v1={signature}")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
