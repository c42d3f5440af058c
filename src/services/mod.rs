// Business logic services
// Gateway client, webhook verification and the transaction ledger.

pub mod datatrans_client;
pub mod ledger;
pub mod webhook_receiver;
pub mod webhook_verifier;

pub use datatrans_client::DatatransClient;
pub use ledger::TransactionLedger;
pub use webhook_receiver::{WebhookReceiver, WebhookSink};
pub use webhook_verifier::WebhookVerifier;
