// Request bodies for the gateway REST API
//
// Method-specific blocks (PAP, TWI, KLN, airlineData, mcp, ...) are carried
// verbatim in `extensions` and flattened into the top-level JSON object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::models::card::{validate_card, Card, CardHolder};
use crate::models::common::{
    Address, Customer, Language, Metadata, Order, PaymentMethod, Redirect, ThreeDSecure,
    TransactionOptions, WebhookTarget,
};
use crate::models::currency::{Amount, Currency};
use crate::utils::validation::{validate_card_number, validate_expiry_month, TWO_DIGITS};

/// Initialize a transaction for the Redirect or Lightbox integration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitRequest {
    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    /// Omitted for card registrations without a payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub customer: Option<Customer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub billing: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub shipping: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub order: Option<Order>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_settle: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<TransactionOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub redirect: Option<Redirect>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub webhook: Option<WebhookTarget>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<PaymentMethod>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_card"))]
    pub card: Option<Card>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl InitRequest {
    pub fn new(amount: Amount, currency: Currency, refno: impl Into<String>) -> Self {
        Self {
            currency,
            refno: refno.into(),
            amount: Some(amount),
            customer: None,
            billing: None,
            shipping: None,
            order: None,
            auto_settle: None,
            option: None,
            language: None,
            redirect: None,
            webhook: None,
            payment_methods: None,
            card: None,
            metadata: None,
            extensions: Map::new(),
        }
    }

    pub fn with_redirect(mut self, redirect: Redirect) -> Self {
        self.redirect = Some(redirect);
        self
    }

    pub fn with_payment_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.payment_methods = Some(methods);
        self
    }

    pub fn with_auto_settle(mut self, auto_settle: bool) -> Self {
        self.auto_settle = Some(auto_settle);
        self
    }
}

/// Initialize a Secure Fields transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecureFieldsInitRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[validate(length(min = 1, max = 4000))]
    pub return_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_d: Option<ThreeDSecure>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

/// Merchant-initiated authorization, typically against a stored alias
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub customer: Option<Customer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub billing: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub shipping: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub order: Option<Order>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_settle: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_card"))]
    pub card: Option<Card>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl AuthorizeRequest {
    pub fn new(amount: Amount, currency: Currency, refno: impl Into<String>, card: Card) -> Self {
        Self {
            amount,
            currency,
            refno: refno.into(),
            customer: None,
            billing: None,
            shipping: None,
            order: None,
            auto_settle: None,
            card: Some(card),
            metadata: None,
            extensions: Map::new(),
        }
    }
}

/// Authorize a transaction that was authenticated beforehand
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeSplitRequest {
    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_settle: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_d: Option<ThreeDSecure>,
}

/// Zero-amount check of an existing alias or card
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    pub currency: Currency,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_card"))]
    pub card: Option<Card>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettleRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub order: Option<Order>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl SettleRequest {
    pub fn new(amount: Amount, currency: Currency, refno: impl Into<String>) -> Self {
        Self {
            amount,
            currency,
            refno: refno.into(),
            order: None,
            extensions: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CancelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 40))]
    pub refno: Option<String>,
}

/// Refund (credit) of a settled transaction
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    /// Full refund when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub order: Option<Order>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

impl CreditRequest {
    pub fn new(amount: Option<Amount>, currency: Currency, refno: impl Into<String>) -> Self {
        Self {
            currency,
            refno: refno.into(),
            amount,
            metadata: None,
            order: None,
            extensions: Map::new(),
        }
    }
}

/// Increase a previously authorized amount
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncreaseRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Fraud screening without authorization
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[validate(length(min = 1, max = 40))]
    pub refno: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub customer: Option<Customer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub billing: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub shipping: Option<Address>,

    #[serde(flatten, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

/// Dynamic currency conversion lookup; exactly one of card number or alias
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_dcc_source"))]
pub struct DccRequest {
    pub amount: Amount,

    pub currency: Currency,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_card_number"))]
    pub card_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub alias: Option<String>,
}

fn validate_dcc_source(request: &DccRequest) -> Result<(), ValidationError> {
    match (&request.card_number, &request.alias) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(ValidationError::new("dcc_source")),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AliasPatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_expiry_month"))]
    pub expiry_month: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(regex(path = *TWO_DIGITS))]
    pub expiry_year: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub cardholder: Option<CardHolder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_network_token: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_plain: Option<bool>,
}
