use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::utils::validation::{
    validate_card_number, validate_expiry_month, validate_identifier, TWO_DIGITS,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardHolder {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 45))]
    pub ip_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub phone_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email_address: Option<String>,
}

/// Stored-credential flags for card-on-file payments
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardOnFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_indicator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_credential_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_scheme_transaction_id: Option<String>,
}

/// Expiry and holder data common to every card representation
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
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
    pub card_on_file: Option<CardOnFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlainCard {
    #[validate(custom(function = "validate_card_number"))]
    pub number: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 4))]
    pub cvv: Option<String>,

    #[serde(flatten)]
    #[validate(nested)]
    pub details: CardDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AliasCard {
    #[validate(custom(function = "validate_identifier"))]
    pub alias: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub details: CardDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkTokenCard {
    #[validate(custom(function = "validate_identifier"))]
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 4))]
    pub cvv: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cryptogram: Option<String>,

    #[serde(flatten)]
    #[validate(nested)]
    pub details: CardDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenCard {
    #[validate(custom(function = "validate_identifier"))]
    pub token: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 4))]
    pub cvv: Option<String>,

    #[serde(flatten)]
    #[validate(nested)]
    pub details: CardDetails,
}

/// Card data in one of the representations the gateway accepts, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Card {
    Plain(PlainCard),
    Alias(AliasCard),
    NetworkToken(NetworkTokenCard),
    DeviceToken(DeviceTokenCard),
}

impl Card {
    pub fn plain(number: impl Into<String>, expiry_month: &str, expiry_year: &str) -> Self {
        Card::Plain(PlainCard {
            number: number.into(),
            cvv: None,
            details: CardDetails {
                expiry_month: Some(expiry_month.to_string()),
                expiry_year: Some(expiry_year.to_string()),
                ..Default::default()
            },
        })
    }

    pub fn alias(alias: impl Into<String>) -> Self {
        Card::Alias(AliasCard {
            alias: alias.into(),
            details: CardDetails::default(),
        })
    }
}

impl Validate for Card {
    fn validate(&self) -> Result<(), ValidationErrors> {
        match self {
            Card::Plain(card) => card.validate(),
            Card::Alias(card) => card.validate(),
            Card::NetworkToken(card) => card.validate(),
            Card::DeviceToken(card) => card.validate(),
        }
    }
}

/// Field-level hook so requests can check an embedded [`Card`]
pub fn validate_card(card: &Card) -> Result<(), ValidationError> {
    card.validate().map_err(|errors| {
        let mut err = ValidationError::new("card");
        err.message = Some(Cow::Owned(errors.to_string()));
        err
    })
}
