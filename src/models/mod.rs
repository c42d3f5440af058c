// Gateway data models
// Amounts and currencies, the transaction lifecycle, request/response bodies and webhooks.

pub mod card;
pub mod common;
pub mod currency;
pub mod requests;
pub mod responses;
pub mod transaction;
pub mod webhook;

pub use card::Card;
pub use currency::{Amount, Currency};
pub use transaction::{Transaction, TransactionDetails, TransactionStatus, TransactionType};
pub use webhook::{SignatureHeader, WebhookEvent, WebhookPayload};
