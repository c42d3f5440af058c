use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use datatrans_gateway::models::{TransactionStatus, WebhookEvent};
use datatrans_gateway::router::build_router;
use datatrans_gateway::{
    AppState, Config, DatatransClient, DatatransConfig, DatatransError, WebhookReceiver,
    WebhookSink, WebhookVerifier,
};

const SECRET: &[u8] = b"s3cret";
const ROUTE: &str = "/datatrans/webhook/";

fn state() -> AppState {
    let datatrans = DatatransConfig::new("1100007006", "api-password", SECRET.to_vec());
    let client = DatatransClient::new(&datatrans).expect("client builds");
    let config = Config {
        port: 0,
        log_level: "debug".to_string(),
        datatrans,
    };
    AppState::new(config, client, WebhookReceiver::new(WebhookVerifier::new(SECRET)))
}

fn signature(body: &str) -> String {
    let now = chrono::Utc::now().timestamp_millis();
    WebhookVerifier::new(SECRET)
        .signature_header(now, body.as_bytes())
        .expect("signing works")
}

fn webhook_request(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(ROUTE)
        .header("Content-Type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("Datatrans-Signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

#[tokio::test]
async fn test_signed_webhook_is_accepted_and_applied() -> Result<()> {
    let state = state();
    let ledger = state.ledger.clone();
    let app = build_router(state);

    let body = json!({
        "transactionId": "230101120000000001",
        "type": "payment",
        "status": "settled",
        "currency": "CHF",
        "refno": "order-42",
        "paymentMethod": "VIS",
        "card": {"masked": "424242xxxxxx4242", "alias": "70119122433810042"},
        "detail": {"settle": {"amount": 1000}}
    })
    .to_string();

    let (status, response) = send(app, webhook_request(&body, Some(&signature(&body)))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"status": "received"}));

    let tx = ledger.get("230101120000000001").expect("transaction recorded");
    assert_eq!(tx.status(), TransactionStatus::Settled);
    assert_eq!(tx.amount().map(u64::from), Some(1000));
    assert_eq!(tx.refno(), Some("order-42"));
    assert_eq!(tx.masked_card(), Some("424242xxxxxx4242"));
    Ok(())
}

#[tokio::test]
async fn test_missing_signature_is_unauthorized() -> Result<()> {
    let (status, response) = send(
        build_router(state()),
        webhook_request(r#"{"transactionId":"1","status":"settled"}"#, None),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], "AUTH_1002");
    Ok(())
}

#[tokio::test]
async fn test_error_body_carries_response_request_id() -> Result<()> {
    let response = build_router(state())
        .oneshot(webhook_request(r#"{"transactionId":"1"}"#, None))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let header = response
        .headers()
        .get("x-request-id")
        .expect("request id header")
        .to_str()?
        .to_string();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body: Value = serde_json::from_slice(&bytes)?;

    assert_eq!(body["request_id"], header.as_str());
    Ok(())
}

#[tokio::test]
async fn test_event_without_status_is_acknowledged_but_not_recorded() -> Result<()> {
    let state = state();
    let ledger = state.ledger.clone();
    let body = r#"{"transactionId":"230101120000000003","type":"payment"}"#;

    let (status, _) =
        send(build_router(state), webhook_request(body, Some(&signature(body)))).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(ledger.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_case_changed_signature_is_unauthorized() -> Result<()> {
    let body = r#"{"transactionId":"1","status":"settled"}"#;
    let header = signature(body);
    let (prefix, digest) = header.split_once("s0=").expect("signature part");
    let tampered = format!("{}s0={}", prefix, digest.to_uppercase());
    assert_ne!(tampered, header);

    let (status, response) =
        send(build_router(state()), webhook_request(body, Some(&tampered))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], "AUTH_1001");
    Ok(())
}

#[tokio::test]
async fn test_wrong_signature_is_unauthorized() -> Result<()> {
    let state = state();
    let ledger = state.ledger.clone();
    let now = chrono::Utc::now().timestamp_millis();

    let (status, response) = send(
        build_router(state),
        webhook_request(
            r#"{"transactionId":"1","status":"settled"}"#,
            Some(&format!("t={},s0=deadbeef", now)),
        ),
    )
    .await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], "AUTH_1001");
    assert!(ledger.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_stale_signature_is_unauthorized() -> Result<()> {
    let body = r#"{"transactionId":"1","status":"settled"}"#;
    let ten_minutes_ago = chrono::Utc::now().timestamp_millis() - 600_000;
    let header = WebhookVerifier::new(SECRET).signature_header(ten_minutes_ago, body.as_bytes())?;

    let (status, _) = send(build_router(state()), webhook_request(body, Some(&header))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_signed_invalid_payloads_are_bad_requests() -> Result<()> {
    for body in ["not json", r#"{"status":"settled"}"#, r#"{"transactionId":""}"#] {
        let (status, _) =
            send(build_router(state()), webhook_request(body, Some(&signature(body)))).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
    }
    Ok(())
}

#[tokio::test]
async fn test_out_of_order_delivery_keeps_latest_status() -> Result<()> {
    let state = state();
    let ledger = state.ledger.clone();

    for status in ["settled", "authorized"] {
        let body = json!({"transactionId": "230101120000000002", "status": status}).to_string();
        let (code, _) =
            send(build_router(state.clone()), webhook_request(&body, Some(&signature(&body)))).await?;
        // a regression is acknowledged so the gateway stops redelivering it
        assert_eq!(code, StatusCode::OK);
    }

    assert_eq!(
        ledger.get("230101120000000002").unwrap().status(),
        TransactionStatus::Settled
    );
    Ok(())
}

struct FailingSink;

#[async_trait]
impl WebhookSink for FailingSink {
    async fn handle(&self, _event: &WebhookEvent) -> datatrans_gateway::Result<()> {
        Err(DatatransError::Configuration("order store unavailable".into()))
    }
}

#[tokio::test]
async fn test_sink_failure_is_server_error() -> Result<()> {
    let app = build_router(state().with_sink(Arc::new(FailingSink)));
    let body = r#"{"transactionId":"1","status":"settled"}"#;

    let (status, response) = send(app, webhook_request(body, Some(&signature(body)))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error"]["code"], "INT_9999");
    Ok(())
}

#[tokio::test]
async fn test_health_and_metrics() -> Result<()> {
    let request = Request::builder().uri("/health").body(Body::empty())?;
    let (status, body) = send(build_router(state()), request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "sandbox");

    let request = Request::builder().uri("/metrics").body(Body::empty())?;
    let (status, _) = send(build_router(state()), request).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_webhook_route_only_accepts_post() -> Result<()> {
    let request = Request::builder().uri(ROUTE).body(Body::empty())?;
    let (status, _) = send(build_router(state()), request).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}
