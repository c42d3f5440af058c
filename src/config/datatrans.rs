use secrecy::{SecretSlice, SecretString};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::constants;
use crate::error::{DatatransError, Result};

/// Gateway environment the merchant account lives in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => constants::hosts::SANDBOX_API,
            Self::Production => constants::hosts::PRODUCTION_API,
        }
    }

    pub fn pay_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => constants::hosts::SANDBOX_PAY,
            Self::Production => constants::hosts::PRODUCTION_PAY,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "test" => Ok(Self::Sandbox),
            "production" | "prod" | "live" => Ok(Self::Production),
            other => Err(format!("Unknown Datatrans environment: {}", other)),
        }
    }
}

/// Merchant credentials and transport settings.
///
/// Built once at startup and handed to [`crate::services::DatatransClient`]
/// and [`crate::services::WebhookVerifier`]; nothing reads it from a global.
/// Credentials stay wrapped in `secrecy` types and print as `[REDACTED]`.
#[derive(Debug, Clone)]
pub struct DatatransConfig {
    /// Merchant id, used as the Basic auth user name
    pub merchant_id: String,

    /// API password from the merchant dashboard
    pub password: SecretString,

    /// Webhook signing key bytes (configured as hex)
    pub hmac_key: SecretSlice<u8>,

    pub environment: Environment,

    /// Overrides the environment's API host (local gateways, mocks)
    pub base_url: Option<String>,

    /// Per-request timeout (default: 30 seconds)
    pub request_timeout_secs: u64,

    /// Maximum accepted webhook timestamp skew (default: 300 seconds)
    pub webhook_max_age_secs: u64,
}

impl DatatransConfig {
    pub fn new(
        merchant_id: impl Into<String>,
        password: impl Into<String>,
        hmac_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            password: SecretString::from(password.into()),
            hmac_key: SecretSlice::from(hmac_key.into()),
            environment: Environment::Sandbox,
            base_url: None,
            request_timeout_secs: constants::http::DEFAULT_TIMEOUT_SECS,
            webhook_max_age_secs: constants::webhook::DEFAULT_MAX_AGE_SECS,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_webhook_max_age(mut self, secs: u64) -> Self {
        self.webhook_max_age_secs = secs;
        self
    }

    /// API host requests are sent to, without a trailing slash
    pub fn api_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.api_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn webhook_max_age(&self) -> Duration {
        Duration::from_secs(self.webhook_max_age_secs)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    DatatransError::Configuration(format!(
                        "{} environment variable is required",
                        key
                    ))
                })
        };

        let merchant_id = required("DATATRANS_MERCHANT_ID")?;
        let password = required("DATATRANS_PASSWORD")?;
        let hmac_key = hex::decode(required("DATATRANS_HMAC_KEY")?.trim()).map_err(|e| {
            DatatransError::Configuration(format!("DATATRANS_HMAC_KEY must be hex: {}", e))
        })?;

        if hmac_key.is_empty() {
            return Err(DatatransError::Configuration(
                "DATATRANS_HMAC_KEY must not be empty".to_string(),
            ));
        }

        let mut config = Self::new(merchant_id, password, hmac_key);

        if let Some(val) = lookup("DATATRANS_ENVIRONMENT") {
            config.environment = val
                .parse()
                .map_err(|e: String| DatatransError::Configuration(e))?;
        }

        if let Some(val) = lookup("DATATRANS_BASE_URL") {
            if !val.trim().is_empty() {
                info!("Using custom Datatrans base URL: {}", val);
                config.base_url = Some(val);
            }
        }

        if let Some(val) = lookup("DATATRANS_REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs >= 1 => {
                    config.request_timeout_secs = secs;
                    info!("Using custom request timeout seconds: {}", secs);
                }
                Ok(_) => warn!(
                    "Invalid request timeout seconds: {}, must be >= 1, using default",
                    val
                ),
                Err(_) => warn!("Failed to parse request timeout seconds: {}, using default", val),
            }
        }

        if let Some(val) = lookup("DATATRANS_WEBHOOK_MAX_AGE_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs >= 1 => {
                    config.webhook_max_age_secs = secs;
                    info!("Using custom webhook max age seconds: {}", secs);
                }
                Ok(_) => warn!(
                    "Invalid webhook max age seconds: {}, must be >= 1, using default",
                    val
                ),
                Err(_) => warn!(
                    "Failed to parse webhook max age seconds: {}, using default",
                    val
                ),
            }
        }

        Ok(config)
    }
}
