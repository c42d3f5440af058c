//! Application state shared across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{DatatransClient, TransactionLedger, WebhookReceiver, WebhookSink};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Outbound gateway client
    pub client: DatatransClient,
    /// Signature check and parsing of inbound notifications
    pub receiver: WebhookReceiver,
    /// Where verified notifications are delivered
    pub sink: Arc<dyn WebhookSink>,
    /// Transactions known to this process
    pub ledger: TransactionLedger,
    /// Prometheus render handle, if a recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// State with the in-memory ledger as webhook sink
    pub fn new(config: Config, client: DatatransClient, receiver: WebhookReceiver) -> Self {
        let ledger = TransactionLedger::new();
        Self {
            config: Arc::new(config),
            client,
            receiver,
            sink: Arc::new(ledger.clone()),
            ledger,
            metrics: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn WebhookSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
