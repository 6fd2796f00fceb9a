//! Service configuration.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/paybox").
    pub data_dir: String,

    /// Payment gateway base URL.
    pub gateway_base_url: String,

    /// Payment gateway API key (optional; deposits are unavailable without
    /// it).
    pub gateway_api_key: Option<String>,

    /// Payment gateway webhook signing secret (optional).
    pub gateway_webhook_secret: Option<String>,

    /// Currency code passed to the gateway (default: "vnd").
    pub currency: String,

    /// API key for approver endpoints (refund resolution, wallet
    /// administration).
    pub approver_api_key: Option<String>,

    /// Seconds between reconciliation sweeps.
    pub reconcile_interval_seconds: u64,

    /// Seconds a deposit may sit pending before the sweep re-queries it.
    pub pending_timeout_seconds: u64,

    /// Seconds before a still-unsettled deposit intent is cancelled.
    pub pending_expiry_seconds: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/paybox".into()),
            gateway_base_url: std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://api.gateway.example".into()),
            gateway_api_key: std::env::var("GATEWAY_API_KEY").ok(),
            gateway_webhook_secret: std::env::var("GATEWAY_WEBHOOK_SECRET").ok(),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "vnd".into()),
            approver_api_key: std::env::var("APPROVER_API_KEY").ok(),
            reconcile_interval_seconds: env_u64("RECONCILE_INTERVAL_SECONDS", 300),
            pending_timeout_seconds: env_u64("PENDING_TIMEOUT_SECONDS", 1800),
            pending_expiry_seconds: env_u64("PENDING_EXPIRY_SECONDS", 86_400),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: env_u64("REQUEST_TIMEOUT_SECONDS", 30),
        }
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/paybox".into(),
            gateway_base_url: "https://api.gateway.example".into(),
            gateway_api_key: None,
            gateway_webhook_secret: None,
            currency: "vnd".into(),
            approver_api_key: None,
            reconcile_interval_seconds: 300,
            pending_timeout_seconds: 1800,
            pending_expiry_seconds: 86_400,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
