use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, Method, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::config::DatatransConfig;
use crate::constants::{endpoints, headers, hosts, http};
use crate::error::{DatatransError, Result};
use crate::middleware::metrics::track_gateway_request;
use crate::models::requests::{
    AliasPatchRequest, AuthorizeRequest, AuthorizeSplitRequest, CancelRequest, CreditRequest,
    DccRequest, IncreaseRequest, InitRequest, ScreenRequest, SecureFieldsInitRequest,
    SettleRequest, ValidateRequest,
};
use crate::models::responses::{
    AliasInfoResponse, AuthorizeResponse, AuthorizeSplitResponse, CreditResponse, DccResponse,
    GatewayErrorBody, IncreaseResponse, InitResponse, ScreenResponse, StatusResponse,
    ValidateResponse,
};

/// Authenticated client for the gateway REST API.
///
/// Every operation makes exactly one HTTP call. Failures are classified into
/// [`DatatransError`] and never retried here.
#[derive(Clone)]
pub struct DatatransClient {
    http: Client,
    base_url: String,
    pay_base_url: &'static str,
    auth_header: SecretString,
}

impl std::fmt::Debug for DatatransClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatatransClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DatatransClient {
    pub fn new(config: &DatatransConfig) -> Result<Self> {
        if config.merchant_id.trim().is_empty() {
            return Err(DatatransError::Configuration(
                "merchant id must not be empty".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(http::USER_AGENT)
            .build()
            .map_err(|e| DatatransError::Configuration(format!("HTTP client: {}", e)))?;

        let credentials = format!(
            "{}:{}",
            config.merchant_id,
            config.password.expose_secret()
        );

        Ok(Self {
            http,
            base_url: config.api_base_url(),
            pay_base_url: config.environment.pay_base_url(),
            auth_header: SecretString::from(format!("Basic {}", STANDARD.encode(credentials))),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- transactions ----

    /// Initialize a Redirect/Lightbox transaction
    #[instrument(skip(self, request), fields(refno = %request.refno))]
    pub async fn init_transaction(
        &self,
        request: &InitRequest,
        idempotency_key: Option<&str>,
    ) -> Result<InitResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[])?;
        self.call("init_transaction", Method::POST, url, Some(request), idempotency_key)
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn secure_fields_init(
        &self,
        request: &SecureFieldsInitRequest,
        idempotency_key: Option<&str>,
    ) -> Result<InitResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::SECURE_FIELDS, &[])?;
        self.call("secure_fields_init", Method::POST, url, Some(request), idempotency_key)
            .await
    }

    /// Server-to-server authorization, e.g. with a stored alias
    #[instrument(skip(self, request), fields(refno = %request.refno))]
    pub async fn authorize(
        &self,
        request: &AuthorizeRequest,
        idempotency_key: Option<&str>,
    ) -> Result<AuthorizeResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::AUTHORIZE, &[])?;
        self.call("authorize", Method::POST, url, Some(request), idempotency_key)
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn authorize_split(
        &self,
        transaction_id: &str,
        request: &AuthorizeSplitRequest,
    ) -> Result<AuthorizeSplitResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id, "authorize"])?;
        self.call("authorize_split", Method::POST, url, Some(request), None)
            .await
    }

    #[instrument(skip(self, request), fields(refno = %request.refno))]
    pub async fn validate_alias(&self, request: &ValidateRequest) -> Result<ValidateResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::VALIDATE, &[])?;
        self.call("validate_alias", Method::POST, url, Some(request), None)
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_status(&self, transaction_id: &str) -> Result<StatusResponse> {
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id])?;
        self.call("get_status", Method::GET, url, None::<&()>, None)
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn settle(&self, transaction_id: &str, request: &SettleRequest) -> Result<()> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id, "settle"])?;
        self.call_no_content("settle", Method::POST, url, Some(request))
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn cancel(&self, transaction_id: &str, request: &CancelRequest) -> Result<()> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id, "cancel"])?;
        self.call_no_content("cancel", Method::POST, url, Some(request))
            .await
    }

    /// Credit a settled transaction back to the cardholder
    #[instrument(skip(self, request))]
    pub async fn refund(
        &self,
        transaction_id: &str,
        request: &CreditRequest,
    ) -> Result<CreditResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id, "credit"])?;
        self.call("refund", Method::POST, url, Some(request), None)
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn increase_amount(
        &self,
        transaction_id: &str,
        request: &IncreaseRequest,
    ) -> Result<IncreaseResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::TRANSACTIONS, &[transaction_id, "increase"])?;
        self.call("increase_amount", Method::POST, url, Some(request), None)
            .await
    }

    // ---- aliases ----

    #[instrument(skip(self, alias))]
    pub async fn get_alias_info(&self, alias: &str) -> Result<AliasInfoResponse> {
        let url = self.endpoint(endpoints::ALIASES, &[alias])?;
        self.call("get_alias_info", Method::GET, url, None::<&()>, None)
            .await
    }

    #[instrument(skip(self, alias, request))]
    pub async fn update_alias(
        &self,
        alias: &str,
        request: &AliasPatchRequest,
    ) -> Result<AliasInfoResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::ALIASES, &[alias])?;
        self.call("update_alias", Method::PATCH, url, Some(request), None)
            .await
    }

    #[instrument(skip(self, alias))]
    pub async fn delete_alias(&self, alias: &str) -> Result<()> {
        let url = self.endpoint(endpoints::ALIASES, &[alias])?;
        self.call_no_content("delete_alias", Method::DELETE, url, None::<&()>)
            .await
    }

    // ---- other services ----

    #[instrument(skip(self, request))]
    pub async fn get_dcc_options(&self, request: &DccRequest) -> Result<DccResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::DCC, &[])?;
        self.call("get_dcc_options", Method::POST, url, Some(request), None)
            .await
    }

    #[instrument(skip(self, request), fields(refno = %request.refno))]
    pub async fn screen_customer(&self, request: &ScreenRequest) -> Result<ScreenResponse> {
        request.validate()?;
        let url = self.endpoint(endpoints::SCREEN, &[])?;
        self.call("screen_customer", Method::POST, url, Some(request), None)
            .await
    }

    // ---- payment page helpers ----

    /// Payment page URL the shopper is redirected to
    pub fn redirect_url(&self, transaction_id: &str) -> String {
        format!("{}{}/{}", self.pay_base_url, endpoints::START, transaction_id)
    }

    /// HTML snippet opening the Lightbox when `button_id` is clicked
    pub fn lightbox_script(&self, transaction_id: &str, button_id: &str) -> String {
        format!(
            r#"<script src="{base}{script}"></script>
<script>
    document.getElementById('{button_id}').onclick = function() {{
        Datatrans.startPayment({{
            transactionId: "{transaction_id}"
        }});
    }};
</script>"#,
            base = self.pay_base_url,
            script = hosts::LIGHTBOX_SCRIPT_PATH,
        )
    }

    // ---- transport ----

    /// Build `<base><path>/<segment>...`, percent-encoding each segment
    fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url> {
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(DatatransError::validation("Identifier must not be empty"));
        }

        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| DatatransError::Configuration(format!("invalid base URL: {}", e)))?;
        if !segments.is_empty() {
            url.path_segments_mut()
                .map_err(|_| {
                    DatatransError::Configuration("base URL cannot carry a path".to_string())
                })?
                .extend(segments);
        }
        Ok(url)
    }

    async fn call<B, T>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Validate,
    {
        let bytes = self
            .execute(operation, method, url, body, idempotency_key)
            .await?;
        decode(operation, &bytes)
    }

    async fn call_no_content<B>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(operation, method, url, body, None).await?;
        Ok(())
    }

    async fn execute<B>(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
        body: Option<&B>,
        idempotency_key: Option<&str>,
    ) -> Result<Vec<u8>>
    where
        B: Serialize + ?Sized,
    {
        let start = Instant::now();
        debug!(operation, %method, %url, "Sending gateway request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .header(header::AUTHORIZATION, self.auth_header.expose_secret())
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }
        if method == Method::POST {
            if let Some(key) = idempotency_key {
                request = request.header(headers::IDEMPOTENCY_KEY, key);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(operation, error = %e, "Gateway request failed before a response");
                track_gateway_request(operation, "network_error", start.elapsed());
                return Err(e.into());
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                track_gateway_request(operation, "network_error", start.elapsed());
                return Err(DatatransError::TransientNetwork(e.to_string()));
            }
        };

        if !status.is_success() {
            let err = gateway_error(status, &bytes);
            warn!(
                operation,
                status = status.as_u16(),
                code = err.vendor_code().unwrap_or_default(),
                "Gateway rejected request"
            );
            track_gateway_request(operation, "gateway_error", start.elapsed());
            return Err(err);
        }

        debug!(operation, status = status.as_u16(), "Gateway request succeeded");
        track_gateway_request(operation, "success", start.elapsed());
        Ok(bytes.to_vec())
    }
}

fn decode<T>(operation: &str, bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(bytes).map_err(|e| {
        warn!(operation, error = %e, "Malformed gateway response");
        DatatransError::Decoding(format!("{}: {}", operation, e))
    })?;
    value
        .validate()
        .map_err(|e| DatatransError::Decoding(format!("{}: {}", operation, e)))?;
    Ok(value)
}

/// Map a non-2xx response onto [`DatatransError::Gateway`], keeping the
/// vendor code when the body has the documented `{"error": {...}}` shape.
fn gateway_error(status: StatusCode, body: &[u8]) -> DatatransError {
    let (code, message) = match serde_json::from_slice::<GatewayErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| parsed.error.code.clone());
            (parsed.error.code, message)
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                status.canonical_reason().unwrap_or("Unknown error").to_string()
            } else {
                text
            };
            (http::UNKNOWN_ERROR_CODE.to_string(), message)
        }
    };

    DatatransError::Gateway {
        status: status.as_u16(),
        code,
        message,
    }
}
