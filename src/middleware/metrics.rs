use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use std::time::{Duration, Instant};

/// Metrics middleware that tracks request metrics for the receiver routes
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!("http_requests_in_flight", "path" => path.clone()).increment(1.0);
    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone()).increment(1);

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .record(start.elapsed().as_secs_f64());

    gauge!("http_requests_in_flight", "path" => path.clone()).decrement(1.0);

    counter!(
        "http_responses_total",
        "method" => method,
        "path" => path,
        "status" => status
    )
    .increment(1);

    response
}

/// Track one outbound gateway call
pub fn track_gateway_request(operation: &'static str, outcome: &'static str, duration: Duration) {
    counter!(
        "datatrans_requests_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);

    histogram!("datatrans_request_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Track an inbound notification by outcome
pub fn track_webhook(outcome: &'static str) {
    counter!("datatrans_webhooks_total", "outcome" => outcome).increment(1);
}
