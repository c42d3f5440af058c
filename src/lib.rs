//! Client SDK and webhook receiver for the Datatrans payment gateway.
//!
//! [`DatatransClient`] wraps the REST API, [`WebhookVerifier`] and
//! [`WebhookReceiver`] authenticate inbound notifications, and
//! [`router::build_router`] exposes the receiver over HTTP.

pub mod app_state;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod router;
pub mod services;
pub mod utils;

pub use app_state::AppState;
pub use config::{Config, DatatransConfig, Environment};
pub use error::{ApiError, AuthFailure, DatatransError, Result};
pub use services::{
    DatatransClient, TransactionLedger, WebhookReceiver, WebhookSink, WebhookVerifier,
};
