// Inbound webhook notifications

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::constants::webhook::{SIGNATURE_PREFIX, TIMESTAMP_PREFIX};
use crate::error::{DatatransError, Result};
use crate::models::currency::{Amount, Currency};
use crate::models::responses::{CardSummary, HistoryEntry, StatusDetail};
use crate::models::transaction::{TransactionDetails, TransactionStatus, TransactionType};

/// Parsed `Datatrans-Signature` header: `t=<unix millis>,s0=<hex digest>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signature: String,
}

impl FromStr for SignatureHeader {
    type Err = DatatransError;

    fn from_str(header: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = header.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(DatatransError::authentication(
                "Invalid signature header format",
            ));
        }

        let mut timestamp = None;
        let mut signature = None;
        for part in parts {
            if let Some(value) = part.strip_prefix(TIMESTAMP_PREFIX) {
                let parsed = value.parse::<i64>().map_err(|_| {
                    DatatransError::authentication("Invalid signature timestamp")
                })?;
                timestamp = Some(parsed);
            } else if let Some(value) = part.strip_prefix(SIGNATURE_PREFIX) {
                signature = Some(value.to_string());
            }
        }

        match (timestamp, signature) {
            (Some(timestamp), Some(signature)) if !signature.is_empty() => {
                Ok(Self { timestamp, signature })
            }
            _ => Err(DatatransError::authentication(
                "Missing timestamp or signature",
            )),
        }
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            TIMESTAMP_PREFIX, self.timestamp, SIGNATURE_PREFIX, self.signature
        )
    }
}

/// Notification body. Everything is optional so that partial payloads can be
/// told apart from malformed JSON; unknown keys end up in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub transaction_id: Option<String>,

    #[serde(default)]
    pub merchant_id: Option<String>,

    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,

    #[serde(default)]
    pub status: Option<TransactionStatus>,

    #[serde(default)]
    pub currency: Option<Currency>,

    #[serde(default)]
    pub refno: Option<String>,

    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub amount: Option<u64>,

    #[serde(default)]
    pub card: Option<CardSummary>,

    #[serde(default)]
    pub detail: Option<StatusDetail>,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebhookPayload {
    /// Reported amount, from the top level or the lifecycle details
    pub fn amount(&self) -> Option<Amount> {
        if let Some(amount) = self.amount.and_then(|minor| Amount::new(minor).ok()) {
            return Some(amount);
        }
        let detail = self.detail.as_ref()?;
        [&detail.settle, &detail.authorize]
            .into_iter()
            .flatten()
            .find_map(|step| step.amount.and_then(|minor| Amount::new(minor).ok()))
    }

    /// Details worth keeping next to the reported status
    pub fn details(&self) -> TransactionDetails {
        let card = self.card.as_ref();
        TransactionDetails {
            amount: self.amount(),
            currency: self.currency,
            payment_method: self.payment_method.clone(),
            refno: self.refno.clone(),
            masked_card: card.and_then(|card| card.masked.clone()),
            alias: card.and_then(|card| card.alias.clone()),
        }
    }
}

/// A notification whose signature has been checked
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    raw: Vec<u8>,
    signature: SignatureHeader,
    transaction_id: String,
    payload: WebhookPayload,
}

impl WebhookEvent {
    /// Only the receiver builds events, after verifying `raw`.
    pub(crate) fn new(raw: &[u8], signature: SignatureHeader, payload: WebhookPayload) -> Result<Self> {
        let transaction_id = match payload.transaction_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                return Err(DatatransError::validation(
                    "Missing transactionId in webhook payload",
                ))
            }
        };

        Ok(Self {
            raw: raw.to_vec(),
            signature,
            transaction_id,
            payload,
        })
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn signature(&self) -> &SignatureHeader {
        &self.signature
    }

    pub fn event_type(&self) -> Option<TransactionType> {
        self.payload.transaction_type
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        self.payload.status
    }

    pub fn payload(&self) -> &WebhookPayload {
        &self.payload
    }
}
