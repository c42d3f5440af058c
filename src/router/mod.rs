//! Router configuration for the webhook receiver.

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::app_state::AppState;
use crate::constants::{server, webhook};
use crate::handlers::{get_prometheus_metrics, health_check, receive_webhook};
use crate::middleware::{metrics_middleware, request_logger_middleware};

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_prometheus_metrics))
        .route(webhook::ROUTE, post(receive_webhook))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(server::REQUEST_TIMEOUT_SECS),
                ))
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(metrics_middleware)),
        )
        .with_state(app_state)
}
