use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DatatransError;

/// ISO 4217 currencies accepted by the gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Aed,
    Aud,
    Bgn,
    Bhd,
    Brl,
    Cad,
    Chf,
    Cny,
    Czk,
    Dkk,
    Eur,
    Gbp,
    Hkd,
    Huf,
    Ils,
    Inr,
    Isk,
    Jpy,
    Krw,
    Kwd,
    Mxn,
    Myr,
    Nok,
    Nzd,
    Omr,
    Pln,
    Ron,
    Sar,
    Sek,
    Sgd,
    Thb,
    Try,
    Twd,
    Usd,
    Zar,
}

impl Currency {
    pub const ALL: [Currency; 35] = [
        Self::Aed,
        Self::Aud,
        Self::Bgn,
        Self::Bhd,
        Self::Brl,
        Self::Cad,
        Self::Chf,
        Self::Cny,
        Self::Czk,
        Self::Dkk,
        Self::Eur,
        Self::Gbp,
        Self::Hkd,
        Self::Huf,
        Self::Ils,
        Self::Inr,
        Self::Isk,
        Self::Jpy,
        Self::Krw,
        Self::Kwd,
        Self::Mxn,
        Self::Myr,
        Self::Nok,
        Self::Nzd,
        Self::Omr,
        Self::Pln,
        Self::Ron,
        Self::Sar,
        Self::Sek,
        Self::Sgd,
        Self::Thb,
        Self::Try,
        Self::Twd,
        Self::Usd,
        Self::Zar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aed => "AED",
            Self::Aud => "AUD",
            Self::Bgn => "BGN",
            Self::Bhd => "BHD",
            Self::Brl => "BRL",
            Self::Cad => "CAD",
            Self::Chf => "CHF",
            Self::Cny => "CNY",
            Self::Czk => "CZK",
            Self::Dkk => "DKK",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Hkd => "HKD",
            Self::Huf => "HUF",
            Self::Ils => "ILS",
            Self::Inr => "INR",
            Self::Isk => "ISK",
            Self::Jpy => "JPY",
            Self::Krw => "KRW",
            Self::Kwd => "KWD",
            Self::Mxn => "MXN",
            Self::Myr => "MYR",
            Self::Nok => "NOK",
            Self::Nzd => "NZD",
            Self::Omr => "OMR",
            Self::Pln => "PLN",
            Self::Ron => "RON",
            Self::Sar => "SAR",
            Self::Sek => "SEK",
            Self::Sgd => "SGD",
            Self::Thb => "THB",
            Self::Try => "TRY",
            Self::Twd => "TWD",
            Self::Usd => "USD",
            Self::Zar => "ZAR",
        }
    }

    /// Number of minor-unit digits (ISO 4217 exponent)
    pub fn exponent(&self) -> u32 {
        match self {
            Self::Isk | Self::Jpy | Self::Krw => 0,
            Self::Bhd | Self::Kwd | Self::Omr => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = DatatransError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == code)
            .ok_or_else(|| DatatransError::validation(format!("Unsupported currency: {}", s)))
    }
}

/// A strictly positive amount in the currency's minor unit (e.g. cents).
///
/// Serialized as a bare JSON integer. There is no floating point anywhere on
/// the path from the caller to the request body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u64", into = "u64")]
pub struct Amount(u64);

impl Amount {
    pub fn new(minor_units: u64) -> Result<Self, DatatransError> {
        if minor_units == 0 {
            return Err(DatatransError::validation("Amount must be positive"));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    /// Render in major units with the currency's exponent, e.g. 1000 CHF -> "10.00"
    pub fn format_major(&self, currency: Currency) -> String {
        let exponent = currency.exponent();
        if exponent == 0 {
            return self.0.to_string();
        }
        let divisor = 10u64.pow(exponent);
        format!(
            "{}.{:0width$}",
            self.0 / divisor,
            self.0 % divisor,
            width = exponent as usize
        )
    }
}

impl TryFrom<u64> for Amount {
    type Error = DatatransError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for u64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
