// Response bodies returned by the gateway
//
// Every type is validated after decoding; the client turns a failed check
// into a decoding error. Unknown fields are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::Result;
use crate::models::currency::{Amount, Currency};
use crate::models::transaction::{
    Transaction, TransactionDetails, TransactionStatus, TransactionType,
};
use crate::utils::validation::{validate_expiry_month, validate_identifier, TWO_DIGITS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceInfo {
    pub integrity: String,
}

/// Result of `init_transaction` and `secure_fields_init`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    #[validate(custom(function = "validate_identifier"))]
    pub transaction_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_token: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<ResourceInfo>,
}

/// Issuer details of a card
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardInfo {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(rename = "type", default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Masked card data echoed back on authorizations and status queries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    #[serde(default)]
    pub masked: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub expiry_month: Option<String>,
    #[serde(default)]
    pub expiry_year: Option<String>,
    #[serde(default)]
    pub info: Option<CardInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeResponse {
    #[validate(custom(function = "validate_identifier"))]
    pub transaction_id: String,

    #[serde(default)]
    pub acquirer_authorization_code: Option<String>,

    #[serde(default)]
    pub card: Option<CardSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeSplitResponse {
    #[serde(default)]
    pub acquirer_authorization_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    #[validate(custom(function = "validate_identifier"))]
    pub transaction_id: String,

    #[serde(default)]
    pub acquirer_authorization_code: Option<String>,

    #[serde(default)]
    pub card: Option<CardSummary>,
}

/// Result of a refund: the credit is its own transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditResponse {
    #[validate(custom(function = "validate_identifier"))]
    pub transaction_id: String,

    #[serde(default)]
    pub acquirer_authorization_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseResponse {
    pub increased_amount: Amount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResponse {
    #[serde(default)]
    pub transaction_id: Option<String>,

    /// Fraud screening verdict from the intelligent risk engine
    #[serde(rename = "INT", default)]
    pub risk: Option<Value>,
}

/// One side of a currency conversion offer
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct DccOption {
    pub amount: Amount,

    /// Cardholder currencies are not limited to the merchant currency list
    #[validate(length(equal = 3))]
    pub currency: String,

    #[serde(default = "default_exponent")]
    pub exponent: u8,
}

fn default_exponent() -> u8 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DccResponse {
    pub dcc_available: bool,

    #[validate(nested)]
    pub original_option: DccOption,

    #[serde(default)]
    #[validate(nested)]
    pub dcc_option: Option<DccOption>,

    #[serde(default)]
    pub base_rate: Option<String>,

    #[serde(default)]
    pub rate: Option<f64>,

    #[serde(default)]
    pub margin: Option<f64>,

    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Amount and acquirer data of a single lifecycle step
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetail {
    /// Zero for card checks
    #[serde(default)]
    pub amount: Option<u64>,

    #[serde(default)]
    pub acquirer_authorization_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatusDetail {
    #[serde(default)]
    pub authorize: Option<ActionDetail>,
    #[serde(default)]
    pub settle: Option<ActionDetail>,
    #[serde(default)]
    pub credit: Option<ActionDetail>,
    #[serde(default)]
    pub cancel: Option<Value>,
    #[serde(default)]
    pub fail: Option<Value>,
}

/// One recorded action on a transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub action: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub ip: Option<String>,
}

impl HistoryEntry {
    /// Status reached by a successful action. Unknown actions map to `None`.
    pub fn status(&self) -> Option<TransactionStatus> {
        match self.action.as_str() {
            "init" => Some(TransactionStatus::Initialized),
            "authenticate" => Some(TransactionStatus::Authenticated),
            "authorize" => Some(TransactionStatus::Authorized),
            "settle" => Some(TransactionStatus::Settled),
            "cancel" => Some(TransactionStatus::Canceled),
            _ => None,
        }
    }
}

/// Full state of a transaction as returned by `get_status`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[validate(custom(function = "validate_identifier"))]
    pub transaction_id: String,

    #[serde(default)]
    pub merchant_id: Option<String>,

    #[serde(rename = "type", default)]
    pub transaction_type: Option<TransactionType>,

    pub status: TransactionStatus,

    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(default)]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub detail: Option<StatusDetail>,

    #[serde(default)]
    pub card: Option<CardSummary>,

    #[serde(default)]
    pub history: Vec<HistoryEntry>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub mcp: Option<Value>,
}

impl StatusResponse {
    /// Amount of the latest lifecycle step that carries one
    pub fn amount(&self) -> Option<Amount> {
        let detail = self.detail.as_ref()?;
        [&detail.settle, &detail.authorize]
            .into_iter()
            .flatten()
            .find_map(|step| step.amount.and_then(|minor| Amount::new(minor).ok()))
    }

    /// Replay the successful history entries and the reported status into a
    /// [`Transaction`]. Fails if the gateway history moves backwards.
    pub fn to_transaction(&self) -> Result<Transaction> {
        let created_at = self
            .history
            .first()
            .map(|entry| entry.date)
            .unwrap_or_else(Utc::now);
        let mut tx = Transaction::untracked(self.transaction_id.clone(), created_at)?;
        let card = self.card.as_ref();
        tx.record_details(TransactionDetails {
            amount: self.amount(),
            currency: Some(self.currency),
            payment_method: self.payment_method.clone(),
            refno: Some(self.refno.clone()),
            masked_card: card.and_then(|card| card.masked.clone()),
            alias: card.and_then(|card| card.alias.clone()),
        });

        let mut last = created_at;
        for entry in self.history.iter().filter(|entry| entry.success) {
            if let Some(status) = entry.status() {
                tx.advance(status, entry.date)?;
            }
            last = entry.date;
        }
        tx.advance(self.status, last)?;
        Ok(tx)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTokenInfo {
    #[serde(default)]
    #[validate(custom(function = "validate_expiry_month"))]
    pub expiry_month: Option<String>,

    #[serde(default)]
    #[validate(regex(path = *TWO_DIGITS))]
    pub expiry_year: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub payment_account_reference: Option<String>,

    #[serde(default)]
    pub token_requestor_id: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub token_created: Option<bool>,
}

/// Card data stored behind an alias
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AliasCardInfo {
    #[serde(default)]
    pub usage: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_expiry_month"))]
    pub expiry_month: Option<String>,

    #[serde(default)]
    #[validate(regex(path = *TWO_DIGITS))]
    pub expiry_year: Option<String>,

    #[serde(default)]
    pub last4: Option<String>,

    #[serde(default)]
    pub bin: Option<String>,

    #[serde(default)]
    pub pan_removed: Option<bool>,

    #[serde(default)]
    pub card_info: Option<CardInfo>,

    #[serde(default)]
    pub card_on_file: Option<Value>,

    #[serde(default)]
    #[validate(nested)]
    pub network_token: Option<NetworkTokenInfo>,
}

/// Result of `get_alias_info` and `update_alias`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AliasInfoResponse {
    #[validate(length(min = 10, max = 100))]
    pub alias: String,

    #[serde(rename = "type")]
    pub alias_type: String,

    pub date_created: DateTime<Utc>,

    #[serde(default)]
    pub fingerprint: Option<String>,

    #[serde(default)]
    pub masked: Option<String>,

    #[serde(default)]
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(default)]
    #[validate(nested)]
    pub card: Option<AliasCardInfo>,
}

/// Error body of a non-2xx gateway response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayErrorBody {
    pub error: VendorError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VendorError {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
}
