use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretSlice};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::config::DatatransConfig;
use crate::constants::webhook::DEFAULT_MAX_AGE_SECS;
use crate::error::{DatatransError, Result};
use crate::models::webhook::SignatureHeader;

type HmacSha256 = Hmac<Sha256>;

/// Checks the `Datatrans-Signature` header of inbound notifications.
///
/// The gateway signs `<timestamp><raw body>` with HMAC-SHA256 and sends
/// `t=<unix millis>,s0=<lowercase hex digest>`. The hex text is compared in
/// constant time and timestamps further than `max_age` from our clock are
/// refused.
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    key: SecretSlice<u8>,
    max_age: Duration,
}

impl WebhookVerifier {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: SecretSlice::from(key.into()),
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
        }
    }

    /// Signing key and max age taken from the merchant configuration
    pub fn from_config(config: &DatatransConfig) -> Self {
        Self {
            key: config.hmac_key.clone(),
            max_age: config.webhook_max_age(),
        }
    }

    /// Key as shown in the merchant dashboard (hex)
    pub fn from_hex(key: &str) -> Result<Self> {
        let key = hex::decode(key.trim())
            .map_err(|e| DatatransError::Configuration(format!("HMAC key is not hex: {}", e)))?;
        if key.is_empty() {
            return Err(DatatransError::Configuration(
                "HMAC key must not be empty".to_string(),
            ));
        }
        Ok(Self::new(key))
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Verify a header value against the raw body, using the current time
    pub fn verify(&self, header: &str, body: &[u8]) -> Result<SignatureHeader> {
        self.verify_at(header, body, chrono::Utc::now().timestamp_millis())
    }

    /// Same as [`verify`](Self::verify) with an explicit clock, in unix millis
    pub fn verify_at(&self, header: &str, body: &[u8], now_millis: i64) -> Result<SignatureHeader> {
        let parsed: SignatureHeader = header.parse()?;

        let max_age_millis = i64::try_from(self.max_age.as_millis()).unwrap_or(i64::MAX);
        let skew = now_millis.saturating_sub(parsed.timestamp).saturating_abs();
        if skew > max_age_millis {
            warn!(
                timestamp = parsed.timestamp,
                skew_ms = skew,
                "Rejecting webhook with stale signature timestamp"
            );
            return Err(DatatransError::authentication(
                "Signature timestamp outside the accepted window",
            ));
        }

        self.verify_digest(parsed.timestamp, body, &parsed.signature)?;
        debug!(timestamp = parsed.timestamp, "Webhook signature verified");
        Ok(parsed)
    }

    /// Check a hex digest for `timestamp` and `body`, without header parsing
    /// or clock checks. Only the exact lowercase text the gateway sends matches.
    pub fn verify_digest(&self, timestamp: i64, body: &[u8], signature: &str) -> Result<()> {
        let expected = self.sign(timestamp, body)?;
        if bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            Ok(())
        } else {
            Err(DatatransError::authentication("Signature mismatch"))
        }
    }

    pub fn is_valid(&self, header: &str, body: &[u8]) -> bool {
        self.verify(header, body).is_ok()
    }

    /// Hex digest the gateway would send for `timestamp` and `body`
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> Result<String> {
        Ok(hex::encode(self.mac(timestamp, body)?.finalize().into_bytes()))
    }

    /// Complete header value for `timestamp` and `body`
    pub fn signature_header(&self, timestamp: i64, body: &[u8]) -> Result<String> {
        let header = SignatureHeader {
            timestamp,
            signature: self.sign(timestamp, body)?,
        };
        Ok(header.to_string())
    }

    fn mac(&self, timestamp: i64, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret())
            .map_err(|e| DatatransError::Configuration(format!("Invalid HMAC key: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(body);
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(b"s3cret".to_vec())
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"status":"settled"}"#;
        let header = verifier().signature_header(NOW, body).unwrap();

        let parsed = verifier().verify_at(&header, body, NOW).unwrap();
        assert_eq!(parsed.timestamp, NOW);
    }

    #[test]
    fn test_known_digest() {
        // HMAC-SHA256("s3cret", "1700000000000{}")
        let mut mac = HmacSha256::new_from_slice(b"s3cret").unwrap();
        mac.update(b"1700000000000{}");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(verifier().sign(NOW, b"{}").unwrap(), expected);
    }

    #[test]
    fn test_wrong_signature() {
        let header = format!("t={},s0=deadbeef", NOW);
        let err = verifier()
            .verify_at(&header, br#"{"status":"settled"}"#, NOW)
            .unwrap_err();
        assert!(matches!(err, DatatransError::Authentication { .. }));
    }

    #[test]
    fn test_modified_payload() {
        let header = verifier().signature_header(NOW, b"{\"amount\":1000}").unwrap();
        assert!(verifier()
            .verify_at(&header, b"{\"amount\":9000}", NOW)
            .is_err());
    }

    #[test]
    fn test_wrong_key() {
        let header = WebhookVerifier::new(b"other".to_vec())
            .signature_header(NOW, b"{}")
            .unwrap();
        assert!(verifier().verify_at(&header, b"{}", NOW).is_err());
    }

    #[test]
    fn test_timestamp_window() {
        let body = b"{}";
        let header = verifier().signature_header(NOW, body).unwrap();

        assert!(verifier().verify_at(&header, body, NOW + 300_000).is_ok());
        assert!(verifier().verify_at(&header, body, NOW + 300_001).is_err());
        assert!(verifier().verify_at(&header, body, NOW - 300_001).is_err());

        let strict = verifier().with_max_age(Duration::from_secs(10));
        assert!(strict.verify_at(&header, body, NOW + 11_000).is_err());
    }

    #[test]
    fn test_non_hex_signature() {
        let header = format!("t={},s0=not-hex", NOW);
        assert!(matches!(
            verifier().verify_at(&header, b"{}", NOW),
            Err(DatatransError::Authentication { .. })
        ));
    }

    #[test]
    fn test_case_changed_signature_fails() {
        let body = br#"{"status":"settled"}"#;
        let signature = verifier().sign(NOW, body).unwrap();
        let upper = signature.to_uppercase();
        assert_ne!(upper, signature);

        for tampered in [upper, flip_first_letter(&signature)] {
            let header = format!("t={},s0={}", NOW, tampered);
            assert!(matches!(
                verifier().verify_at(&header, body, NOW),
                Err(DatatransError::Authentication { .. })
            ));
        }
    }

    fn flip_first_letter(signature: &str) -> String {
        let mut flipped = false;
        signature
            .chars()
            .map(|c| {
                if !flipped && c.is_ascii_lowercase() {
                    flipped = true;
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn test_from_config() {
        let config = DatatransConfig::new("1100007006", "pw", b"s3cret".to_vec())
            .with_webhook_max_age(60);
        let from_config = WebhookVerifier::from_config(&config);
        assert_eq!(from_config.max_age(), Duration::from_secs(60));

        let header = verifier().signature_header(NOW, b"{}").unwrap();
        assert!(from_config.verify_at(&header, b"{}", NOW).is_ok());
        assert!(!format!("{:?}", from_config).contains("s3cret"));
    }

    #[test]
    fn test_from_hex() {
        assert!(WebhookVerifier::from_hex("73336372657400").is_ok());
        assert!(matches!(
            WebhookVerifier::from_hex("zz"),
            Err(DatatransError::Configuration(_))
        ));
        assert!(WebhookVerifier::from_hex("").is_err());
    }

    #[test]
    fn test_is_valid_uses_current_time() {
        let body = b"{}";
        let now = chrono::Utc::now().timestamp_millis();
        let header = verifier().signature_header(now, body).unwrap();
        assert!(verifier().is_valid(&header, body));
        assert!(!verifier().is_valid(&format!("t={},s0=deadbeef", now), body));
    }
}
