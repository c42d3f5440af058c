use anyhow::Result;
use std::env;

use crate::constants;

pub mod datatrans;
pub use datatrans::{DatatransConfig, Environment};

/// Process configuration for the webhook receiver binary.
///
/// Reads the process environment only; the binary loads `.env` beforehand.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub datatrans: DatatransConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| constants::server::DEFAULT_PORT.to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT must be a valid port number: {}", e))?,
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "datatrans_gateway=debug,tower_http=debug".to_string()),
            datatrans: DatatransConfig::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to load Datatrans config: {}", e))?,
        })
    }
}
