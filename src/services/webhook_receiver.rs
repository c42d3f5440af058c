use async_trait::async_trait;
use axum::http::HeaderMap;
use tracing::{info, warn};

use crate::constants::headers::SIGNATURE;
use crate::error::{DatatransError, Result};
use crate::middleware::metrics::track_webhook;
use crate::models::webhook::{WebhookEvent, WebhookPayload};
use crate::services::webhook_verifier::WebhookVerifier;

/// Application-side handling of a verified notification
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn handle(&self, event: &WebhookEvent) -> Result<()>;
}

/// Turns raw notification requests into [`WebhookEvent`]s.
///
/// Framework independent: callers pass the request headers and the raw body
/// exactly as received. The body is only parsed once the signature matches.
#[derive(Debug, Clone)]
pub struct WebhookReceiver {
    verifier: WebhookVerifier,
}

impl WebhookReceiver {
    pub fn new(verifier: WebhookVerifier) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &WebhookVerifier {
        &self.verifier
    }

    pub fn receive(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookEvent> {
        let result = self.receive_inner(headers, body);
        match &result {
            Ok(event) => {
                track_webhook("accepted");
                info!(
                    transaction_id = event.transaction_id(),
                    status = ?event.status(),
                    event_type = ?event.event_type(),
                    "Webhook received"
                );
            }
            Err(e) => {
                track_webhook(rejection_reason(e));
                warn!(error = %e, "Webhook rejected");
            }
        }
        result
    }

    fn receive_inner(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookEvent> {
        let header = headers
            .get(SIGNATURE)
            .ok_or_else(|| DatatransError::missing_signature("Missing Datatrans-Signature header"))?
            .to_str()
            .map_err(|_| DatatransError::authentication("Signature header is not ASCII"))?;

        let signature = self.verifier.verify(header, body)?;

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|e| DatatransError::Decoding(format!("Invalid webhook payload: {}", e)))?;

        WebhookEvent::new(body, signature, payload)
    }
}

fn rejection_reason(err: &DatatransError) -> &'static str {
    match err {
        DatatransError::Authentication { .. } => "unauthenticated",
        DatatransError::Decoding(_) => "malformed",
        DatatransError::Validation(_) => "invalid",
        _ => "error",
    }
}
