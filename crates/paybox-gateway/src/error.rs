//! Error types for gateway operations.

/// Errors that can occur when talking to the payment provider.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider API returned an error body.
    #[error("gateway API error: {error_type} - {message}")]
    Api {
        /// Error type reported by the provider.
        error_type: String,
        /// Error message reported by the provider.
        message: String,
        /// Provider error code, if any.
        code: Option<String>,
    },

    /// The provider does not know the intent.
    #[error("unknown payment intent: {intent_id}")]
    UnknownIntent {
        /// The intent id that was not found.
        intent_id: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
