//! HTTP gateway client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::types::{IntentState, IntentStatus, PaymentIntent};
use crate::{PaymentGateway, Result};

/// Provider REST API client.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Provider payment-intent resource (response shape).
#[derive(Debug, Deserialize)]
struct IntentResource {
    id: String,
    status: String,
    amount: i64,
    #[serde(default)]
    client_secret: Option<String>,
}

/// Provider error envelope.
#[derive(Debug, Deserialize)]
struct ProviderErrorResponse {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl HttpGateway {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Provider API base URL (no trailing slash)
    /// * `api_key` - Provider secret API key
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse the provider's error envelope
        let error_body: std::result::Result<ProviderErrorResponse, _> = response.json().await;

        match error_body {
            Ok(provider_error) => Err(GatewayError::Api {
                error_type: provider_error.error.error_type,
                message: provider_error.error.message,
                code: provider_error.error.code,
            }),
            Err(_) => Err(GatewayError::Api {
                error_type: "unknown".to_string(),
                message: format!("HTTP {status}"),
                code: None,
            }),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_intent(&self, amount: i64, currency: &str) -> Result<PaymentIntent> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
        ];

        tracing::debug!(amount = %amount, currency = %currency, "Creating payment intent");

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.api_key)
            .form(&params)
            .send()
            .await?;

        let resource: IntentResource = Self::handle_response(response).await?;

        Ok(PaymentIntent {
            client_secret: resource.client_secret.unwrap_or_default(),
            intent_id: resource.id,
        })
    }

    async fn get_intent_status(&self, intent_id: &str) -> Result<IntentState> {
        let response = self
            .client
            .get(format!("{}/v1/payment_intents/{intent_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownIntent {
                intent_id: intent_id.to_string(),
            });
        }

        let resource: IntentResource = Self::handle_response(response).await?;

        Ok(IntentState {
            status: IntentStatus::from_provider(&resource.status),
            amount: resource.amount,
        })
    }
}
