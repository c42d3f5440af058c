use axum::{
    body::Bytes,
    extract::{Extension, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::RequestId;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WebhookAck {
    pub status: String,
}

/// Receive a gateway notification.
///
/// The raw body is verified against `Datatrans-Signature` before anything is
/// parsed; the verified event is then handed to the configured sink.
pub async fn receive_webhook(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let event = state.receiver.receive(&headers, &body)?;

    state.sink.handle(&event).await.map_err(|e| {
        error!(
            request_id = %request_id.0,
            transaction_id = event.transaction_id(),
            error = %e,
            "Webhook sink failed"
        );
        ApiError::Internal(e.to_string())
    })?;

    Ok(Json(WebhookAck {
        status: "received".to_string(),
    }))
}
