//! Gateway constants and default configuration values.
//!
//! Endpoint paths, header names and limits used by the client, the webhook
//! verifier and the receiver live here so they can be adjusted in one place.

/// Gateway hosts
pub mod hosts {
    /// Sandbox REST API
    pub const SANDBOX_API: &str = "https://api.sandbox.datatrans.com";

    /// Production REST API
    pub const PRODUCTION_API: &str = "https://api.datatrans.com";

    /// Sandbox payment page host
    pub const SANDBOX_PAY: &str = "https://pay.sandbox.datatrans.com";

    /// Production payment page host
    pub const PRODUCTION_PAY: &str = "https://pay.datatrans.com";

    /// Lightbox script path, relative to the payment page host
    pub const LIGHTBOX_SCRIPT_PATH: &str = "/upp/payment/js/datatrans-2.0.0.js";
}

/// REST endpoint paths
pub mod endpoints {
    pub const TRANSACTIONS: &str = "/v1/transactions";
    pub const SECURE_FIELDS: &str = "/v1/transactions/secureFields";
    pub const AUTHORIZE: &str = "/v1/transactions/authorize";
    pub const VALIDATE: &str = "/v1/transactions/validate";
    pub const DCC: &str = "/v1/transactions/dcc";
    pub const SCREEN: &str = "/v1/transactions/screen";
    pub const ALIASES: &str = "/v1/aliases";
    pub const START: &str = "/v1/start";
}

/// HTTP header names
pub mod headers {
    /// Signature header sent by the gateway on every webhook
    pub const SIGNATURE: &str = "Datatrans-Signature";

    /// Idempotency header accepted on POST initiation calls
    pub const IDEMPOTENCY_KEY: &str = "Idempotency-Key";
}

/// Webhook verification
pub mod webhook {
    /// Default tolerated clock skew between the gateway and us, in seconds
    pub const DEFAULT_MAX_AGE_SECS: u64 = 300;

    /// Timestamp component prefix in the signature header
    pub const TIMESTAMP_PREFIX: &str = "t=";

    /// Signature component prefix in the signature header
    pub const SIGNATURE_PREFIX: &str = "s0=";

    /// Route the receiver is mounted on
    pub const ROUTE: &str = "/datatrans/webhook/";
}

/// Transport
pub mod http {
    /// Default per-request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// User agent sent with every gateway request
    pub const USER_AGENT: &str = concat!("datatrans-gateway/", env!("CARGO_PKG_VERSION"));

    /// Vendor error code used when a non-2xx body is not the documented shape
    pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
}

/// Receiver server
pub mod server {
    /// Default listening port
    pub const DEFAULT_PORT: u16 = 8080;

    /// Request timeout applied by the router, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
