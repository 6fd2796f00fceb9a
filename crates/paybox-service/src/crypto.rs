//! Cryptographic utilities for webhook verification.
//!
//! The payment gateway signs webhook deliveries with an HMAC-SHA256 over
//! `"{timestamp}.{payload}"`, carried in a `gateway-signature` header of the
//! form `t=<timestamp>,v1=<hex signature>`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 and return hex-encoded result.
///
/// # Panics
///
/// This function will never panic in practice. The `expect` call is guarded by
/// the invariant that HMAC-SHA256 accepts keys of any size per RFC 2104.
#[must_use]
pub fn hmac_sha256_hex(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC-SHA256 accepts any key size");
    mac.update(message.as_bytes());
    let result = mac.finalize();

    hex::encode(result.into_bytes())
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Verify a gateway webhook signature header against the raw payload.
///
/// Returns `false` for malformed headers as well as signature mismatches.
#[must_use]
pub fn verify_webhook_signature(secret: &str, payload: &str, signature_header: &str) -> bool {
    let mut timestamp = None;
    let mut signature = None;

    for part in signature_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = Some(t);
        } else if let Some(v1) = part.strip_prefix("v1=") {
            signature = Some(v1);
        }
    }

    let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
        return false;
    };

    let signed_payload = format!("{timestamp}.{payload}");
    let expected = hmac_sha256_hex(secret, &signed_payload);

    constant_time_eq(&expected, signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha256_produces_correct_length() {
        let result = hmac_sha256_hex("key", "The quick brown fox jumps over the lazy dog");
        assert_eq!(result.len(), 64); // SHA256 = 32 bytes = 64 hex chars
    }

    #[test]
    fn hmac_sha256_is_deterministic() {
        assert_eq!(
            hmac_sha256_hex("secret", "message"),
            hmac_sha256_hex("secret", "message")
        );
    }

    #[test]
    fn constant_time_eq_equal_strings() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(constant_time_eq("", ""));
    }

    #[test]
    fn constant_time_eq_different_strings() {
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ab"));
        assert!(!constant_time_eq("abc", "ABC"));
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let sig = hmac_sha256_hex("whsec_test", &format!("1700000000.{payload}"));
        let header = format!("t=1700000000,v1={sig}");

        assert!(verify_webhook_signature("whsec_test", payload, &header));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let payload = r#"{"type":"payment_intent.succeeded"}"#;
        let sig = hmac_sha256_hex("whsec_other", &format!("1700000000.{payload}"));
        let header = format!("t=1700000000,v1={sig}");

        assert!(!verify_webhook_signature("whsec_test", payload, &header));
    }

    #[test]
    fn verify_rejects_malformed_header() {
        assert!(!verify_webhook_signature("whsec_test", "{}", "garbage"));
        assert!(!verify_webhook_signature("whsec_test", "{}", "t=123"));
        assert!(!verify_webhook_signature("whsec_test", "{}", "v1=deadbeef"));
    }
}
