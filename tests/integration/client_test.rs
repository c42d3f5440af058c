use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datatrans_gateway::models::card::Card;
use datatrans_gateway::models::requests::{
    AliasPatchRequest, AuthorizeRequest, CancelRequest, CreditRequest, DccRequest, InitRequest,
    SettleRequest,
};
use datatrans_gateway::models::{Amount, Currency, TransactionStatus};
use datatrans_gateway::{DatatransClient, DatatransConfig, DatatransError};

const MERCHANT_ID: &str = "1100007006";
const PASSWORD: &str = "api-password";
const TX_ID: &str = "230101120000000001";
const ALIAS: &str = "AAABcH0Bq92s3kgAESIAAbGj5NIsAHWC";

fn config(base_url: &str) -> DatatransConfig {
    DatatransConfig::new(MERCHANT_ID, PASSWORD, vec![0x73, 0x33]).with_base_url(base_url)
}

fn client(server: &MockServer) -> DatatransClient {
    DatatransClient::new(&config(&server.uri())).expect("client builds")
}

fn chf(minor: u64) -> Amount {
    Amount::new(minor).unwrap()
}

fn basic_auth() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", MERCHANT_ID, PASSWORD)))
}

#[tokio::test]
async fn test_init_then_status_moves_forward() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions"))
        .and(header("Authorization", basic_auth().as_str()))
        .and(header("Content-Type", "application/json"))
        .and(body_partial_json(json!({"amount": 1000, "currency": "CHF", "refno": "order-42"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"transactionId": TX_ID})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/transactions/{}", TX_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": TX_ID,
            "type": "payment",
            "status": "authorized",
            "currency": "CHF",
            "refno": "order-42",
            "detail": {"authorize": {"amount": 1000}},
            "history": [
                {"action": "init", "date": "2023-01-01T12:00:00Z", "success": true},
                {"action": "authorize", "date": "2023-01-01T12:01:00Z", "success": true}
            ]
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let init = client
        .init_transaction(&InitRequest::new(chf(1000), Currency::Chf, "order-42"), None)
        .await?;
    assert_eq!(init.transaction_id, TX_ID);

    let status = client.get_status(&init.transaction_id).await?;
    assert!(status.status.rank() >= TransactionStatus::Initialized.rank());

    let tx = status.to_transaction()?;
    assert_eq!(tx.status(), TransactionStatus::Authorized);
    assert_eq!(tx.amount(), Some(chf(1000)));
    Ok(())
}

#[tokio::test]
async fn test_user_agent_and_idempotency_key_are_sent() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions/authorize"))
        .and(header("Idempotency-Key", "order-42-attempt-1"))
        .and(header_exists("User-Agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": TX_ID,
            "acquirerAuthorizationCode": "123456"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = AuthorizeRequest::new(chf(1000), Currency::Chf, "order-42", Card::alias(ALIAS));
    let response = client(&server)
        .authorize(&request, Some("order-42-attempt-1"))
        .await?;
    assert_eq!(response.acquirer_authorization_code.as_deref(), Some("123456"));

    let received = server.received_requests().await.unwrap_or_default();
    let user_agent = received[0]
        .headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(user_agent.starts_with("datatrans-gateway/"));
    Ok(())
}

#[tokio::test]
async fn test_vendor_error_is_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "INVALID_PROPERTY", "message": "init.amount is invalid"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .init_transaction(&InitRequest::new(chf(1000), Currency::Chf, "order-42"), None)
        .await
        .unwrap_err();

    match err {
        DatatransError::Gateway {
            status,
            ref code,
            ref message,
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, "INVALID_PROPERTY");
            assert_eq!(message, "init.amount is invalid");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unstructured_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/transactions/{}", TX_ID)))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let err = client(&server).get_status(TX_ID).await.unwrap_err();
    assert_eq!(err.vendor_code(), Some("UNKNOWN_ERROR"));
}

#[tokio::test]
async fn test_malformed_body_is_decoding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .init_transaction(&InitRequest::new(chf(1000), Currency::Chf, "order-42"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DatatransError::Decoding(_)));
}

#[tokio::test]
async fn test_missing_required_field_is_decoding_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/transactions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"transactionId": ""})))
        .mount(&server)
        .await;

    let err = client(&server)
        .init_transaction(&InitRequest::new(chf(1000), Currency::Chf, "order-42"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DatatransError::Decoding(_)));
}

#[tokio::test]
async fn test_connection_refused_is_transient() {
    // nothing listens on port 1
    let client = DatatransClient::new(&config("http://127.0.0.1:1")).unwrap();
    let err = client.get_status(TX_ID).await.unwrap_err();
    assert!(matches!(err, DatatransError::TransientNetwork(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_timeout_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/transactions/{}", TX_ID)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = DatatransClient::new(&config(&server.uri()).with_request_timeout(1)).unwrap();
    let err = client.get_status(TX_ID).await.unwrap_err();
    assert!(matches!(err, DatatransError::TransientNetwork(_)));
}

#[tokio::test]
async fn test_invalid_request_never_hits_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);

    let bad_card = AuthorizeRequest::new(
        chf(1000),
        Currency::Chf,
        "order-42",
        Card::plain("4242424242424241", "06", "30"),
    );
    let err = client.authorize(&bad_card, None).await.unwrap_err();
    assert!(matches!(err, DatatransError::Validation(_)));

    let dcc = DccRequest {
        amount: chf(1000),
        currency: Currency::Chf,
        card_number: None,
        alias: None,
    };
    let err = client.get_dcc_options(&dcc).await.unwrap_err();
    assert!(matches!(err, DatatransError::Validation(_)));

    let err = client
        .settle(" ", &SettleRequest::new(chf(1000), Currency::Chf, "order-42"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatatransError::Validation(_)));
}

#[tokio::test]
async fn test_settle_and_cancel_return_unit() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{}/settle", TX_ID)))
        .and(body_json(json!({"amount": 1000, "currency": "CHF", "refno": "order-42"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{}/cancel", TX_ID)))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client
        .settle(TX_ID, &SettleRequest::new(chf(1000), Currency::Chf, "order-42"))
        .await?;
    client.cancel(TX_ID, &CancelRequest::default()).await?;
    Ok(())
}

#[tokio::test]
async fn test_refund_returns_credit_transaction() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/transactions/{}/credit", TX_ID)))
        .and(body_json(json!({"currency": "CHF", "refno": "refund-1", "amount": 500})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionId": "230101120000000099",
            "acquirerAuthorizationCode": "654321"
        })))
        .mount(&server)
        .await;

    let credit = client(&server)
        .refund(TX_ID, &CreditRequest::new(Some(chf(500)), Currency::Chf, "refund-1"))
        .await?;
    assert_eq!(credit.transaction_id, "230101120000000099");
    Ok(())
}

#[tokio::test]
async fn test_alias_lifecycle() -> Result<()> {
    let server = MockServer::start().await;
    let alias_path = format!("/v1/aliases/{}", ALIAS);

    Mock::given(method("PATCH"))
        .and(path(alias_path.as_str()))
        .and(body_json(json!({"expiryMonth": "07", "expiryYear": "31"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "alias": ALIAS,
            "type": "CARD",
            "dateCreated": "2023-01-01T12:00:00Z",
            "card": {"expiryMonth": "07", "expiryYear": "31", "last4": "4242"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(alias_path.as_str()))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(alias_path.as_str()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "ALIAS_NOT_FOUND", "message": "alias not found"}
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let patch = AliasPatchRequest {
        expiry_month: Some("07".into()),
        expiry_year: Some("31".into()),
        ..Default::default()
    };
    let info = client.update_alias(ALIAS, &patch).await?;
    assert_eq!(info.card.and_then(|c| c.expiry_year).as_deref(), Some("31"));

    client.delete_alias(ALIAS).await?;

    // a second delete surfaces the vendor error instead of swallowing it
    let err = client.delete_alias(ALIAS).await.unwrap_err();
    assert_eq!(err.vendor_code(), Some("ALIAS_NOT_FOUND"));
    Ok(())
}
