// Transaction lifecycle as seen from the merchant side

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DatatransError, Result};
use crate::models::currency::{Amount, Currency};

/// Kind of transaction reported by the gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Payment,
    Credit,
    CardCheck,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Credit => "credit",
            Self::CardCheck => "card_check",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Initialized,
    Authenticated,
    Authorized,
    Settled,
    Transmitted,
    #[serde(alias = "cancelled")]
    Canceled,
    Failed,
    Refunded,
    Compensated,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Authenticated => "authenticated",
            Self::Authorized => "authorized",
            Self::Settled => "settled",
            Self::Transmitted => "transmitted",
            Self::Canceled => "canceled",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::Compensated => "compensated",
        }
    }

    /// Position in the forward-only lifecycle. Terminal states share the top rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Initialized => 0,
            Self::Authenticated => 1,
            Self::Authorized => 2,
            Self::Settled => 3,
            Self::Transmitted => 4,
            Self::Canceled | Self::Failed | Self::Refunded | Self::Compensated => 5,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.rank() == 5
    }

    /// Whether the gateway may report `next` after `self`.
    ///
    /// Repeating the current status is allowed (redelivered notifications).
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DatatransError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "initialized" => Ok(Self::Initialized),
            "authenticated" => Ok(Self::Authenticated),
            "authorized" => Ok(Self::Authorized),
            "settled" => Ok(Self::Settled),
            "transmitted" => Ok(Self::Transmitted),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            "compensated" => Ok(Self::Compensated),
            _ => Err(DatatransError::validation(format!(
                "Unknown transaction status: {}",
                s
            ))),
        }
    }
}

/// Descriptive fields the gateway reports next to a status.
///
/// Absent values never overwrite what is already recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDetails {
    pub amount: Option<Amount>,
    pub currency: Option<Currency>,
    pub payment_method: Option<String>,
    /// Merchant reference
    pub refno: Option<String>,
    pub masked_card: Option<String>,
    pub alias: Option<String>,
}

/// Client-side view of a single payment attempt.
///
/// Fields are only changed through [`Transaction::advance`], which refuses
/// any status regression.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    transaction_id: String,
    amount: Option<Amount>,
    currency: Option<Currency>,
    status: TransactionStatus,
    payment_method: Option<String>,
    refno: Option<String>,
    masked_card: Option<String>,
    alias: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    authorized_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// A freshly initialized transaction
    pub fn new(transaction_id: impl Into<String>, amount: Amount, currency: Currency) -> Result<Self> {
        let mut tx = Self::untracked(transaction_id, Utc::now())?;
        tx.amount = Some(amount);
        tx.currency = Some(currency);
        Ok(tx)
    }

    /// A transaction we only know the id of, e.g. first seen through a webhook
    pub fn untracked(transaction_id: impl Into<String>, at: DateTime<Utc>) -> Result<Self> {
        let transaction_id = transaction_id.into();
        if transaction_id.trim().is_empty() {
            return Err(DatatransError::validation("Transaction id must not be empty"));
        }
        Ok(Self {
            transaction_id,
            amount: None,
            currency: None,
            status: TransactionStatus::Initialized,
            payment_method: None,
            refno: None,
            masked_card: None,
            alias: None,
            created_at: at,
            updated_at: at,
            authorized_at: None,
            settled_at: None,
        })
    }

    /// Replay a reported status sequence. Any regression rejects the whole history.
    pub fn from_history<I>(
        transaction_id: impl Into<String>,
        amount: Amount,
        currency: Currency,
        history: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (TransactionStatus, DateTime<Utc>)>,
    {
        let mut tx = Self::new(transaction_id, amount, currency)?;
        let mut first = true;
        for (status, at) in history {
            if first {
                tx.created_at = at;
                tx.updated_at = at;
                first = false;
            }
            tx.advance(status, at)?;
        }
        Ok(tx)
    }

    /// Apply a gateway-reported status. Returns `true` if the status changed.
    pub fn advance(&mut self, next: TransactionStatus, at: DateTime<Utc>) -> Result<bool> {
        if !self.status.can_transition_to(next) {
            return Err(DatatransError::validation(format!(
                "Transaction {} cannot move from {} to {}",
                self.transaction_id, self.status, next
            )));
        }
        if self.status == next {
            return Ok(false);
        }

        self.status = next;
        self.updated_at = at;
        match next {
            TransactionStatus::Authorized => self.authorized_at = Some(at),
            TransactionStatus::Settled => self.settled_at = Some(at),
            _ => {}
        }
        Ok(true)
    }

    /// Fill in details the gateway reported later on
    pub fn record_details(&mut self, details: TransactionDetails) {
        let TransactionDetails {
            amount,
            currency,
            payment_method,
            refno,
            masked_card,
            alias,
        } = details;

        self.amount = amount.or(self.amount);
        self.currency = currency.or(self.currency);
        self.payment_method = payment_method.or(self.payment_method.take());
        self.refno = refno.or(self.refno.take());
        self.masked_card = masked_card.or(self.masked_card.take());
        self.alias = alias.or(self.alias.take());
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn amount(&self) -> Option<Amount> {
        self.amount
    }

    pub fn currency(&self) -> Option<Currency> {
        self.currency
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn refno(&self) -> Option<&str> {
        self.refno.as_deref()
    }

    pub fn masked_card(&self) -> Option<&str> {
        self.masked_card.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn authorized_at(&self) -> Option<DateTime<Utc>> {
        self.authorized_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }
}
