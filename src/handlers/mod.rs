// HTTP handlers for the webhook receiver

pub mod health;
pub mod metrics;
pub mod webhook;

pub use health::health_check;
pub use metrics::get_prometheus_metrics;
pub use webhook::receive_webhook;
