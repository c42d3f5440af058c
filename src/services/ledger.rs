use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::transaction::Transaction;
use crate::models::webhook::WebhookEvent;
use crate::services::webhook_receiver::WebhookSink;

/// In-memory record of transactions, fed by webhooks.
///
/// Concurrent deliveries for the same id are serialized by the map shard
/// lock. A status that would move a transaction backwards is logged and
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct TransactionLedger {
    transactions: Arc<DashMap<String, Transaction>>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a transaction created through the client
    pub fn track(&self, transaction: Transaction) {
        self.transactions
            .insert(transaction.transaction_id().to_string(), transaction);
    }

    pub fn get(&self, transaction_id: &str) -> Option<Transaction> {
        self.transactions
            .get(transaction_id)
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Apply an event. Returns `true` if the stored status changed.
    pub fn apply(&self, event: &WebhookEvent) -> Result<bool> {
        let now = Utc::now();
        let id = event.transaction_id();

        let Some(status) = event.status() else {
            debug!(transaction_id = id, "Webhook without status, nothing recorded");
            return Ok(false);
        };

        let mut entry = match self.transactions.entry(id.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => entry.into_ref(),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                warn!(transaction_id = id, "Transaction not tracked, creating record");
                entry.insert(Transaction::untracked(id, now)?)
            }
        };

        let tx = entry.value_mut();
        match tx.advance(status, now) {
            Ok(changed) => {
                tx.record_details(event.payload().details());
                if changed {
                    info!(transaction_id = id, status = %status, "Updated transaction status");
                }
                Ok(changed)
            }
            Err(e) => {
                warn!(
                    transaction_id = id,
                    current = %tx.status(),
                    reported = %status,
                    error = %e,
                    "Ignoring out-of-order status"
                );
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl WebhookSink for TransactionLedger {
    async fn handle(&self, event: &WebhookEvent) -> Result<()> {
        self.apply(event).map(|_| ())
    }
}
