// Building blocks shared by several gateway requests

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::models::currency::Amount;
use crate::utils::validation::{validate_birth_date, validate_http_method};

/// Payment method codes used by the gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentMethod {
    #[serde(rename = "VIS")]
    Visa,
    #[serde(rename = "ECA")]
    Mastercard,
    #[serde(rename = "AMX")]
    Amex,
    #[serde(rename = "PAP")]
    PayPal,
    #[serde(rename = "TWI")]
    Twint,
    #[serde(rename = "PFC")]
    PostFinanceCard,
    #[serde(rename = "KLN")]
    Klarna,
    #[serde(rename = "APL")]
    ApplePay,
    #[serde(rename = "PAY")]
    GooglePay,
    #[serde(rename = "ALP")]
    Alipay,
    #[serde(rename = "SWH")]
    Swish,
    #[serde(rename = "VPS")]
    Vipps,
    #[serde(rename = "MBP")]
    MobilePay,
    #[serde(rename = "PFP")]
    PostFinancePay,
}

/// Payment page languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    It,
    Es,
    El,
    Fi,
    Hu,
    Ko,
    Nl,
    No,
    Da,
    Pl,
    Pt,
    Ru,
    Ja,
    Sk,
    Sl,
    Sv,
    Tr,
    Zh,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Billing or shipping address
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub street: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub street2: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub zip_code: Option<String>,

    /// ISO 3166-1 alpha-2
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2))]
    pub country: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_birth_date"))]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email, length(max = 255))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub cell_phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    /// `P` (private) or `C` (corporate)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[validate(length(equal = 1))]
    pub customer_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 45))]
    pub ip_address: Option<String>,
}

/// Line item of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub quantity: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,

    /// VAT rate in percent
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub vat: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Amount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct Order {
    #[validate(nested)]
    pub articles: Vec<Article>,
}

/// Where the payment page sends the shopper afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Redirect {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub success_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub cancel_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 4000))]
    pub error_url: Option<String>,
}

/// Per-transaction webhook override
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct WebhookTarget {
    #[validate(length(min = 1, max = 4000))]
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_http_method"))]
    pub method: Option<String>,
}

/// 3-D Secure data passed through to the acquirer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDSecure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_indicator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exemption: Option<String>,

    #[serde(rename = "threeDSTransactionId", skip_serializing_if = "Option::is_none")]
    pub three_ds_transaction_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_status_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_info: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_extensions: Option<Vec<Value>>,
}

/// Behaviour switches of an initialization
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_alias: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticate_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_mobile_token: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_customer_data: Option<bool>,
}

/// Free-form merchant metadata echoed back in webhooks
pub type Metadata = Map<String, Value>;
