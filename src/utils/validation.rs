//! Field validators shared by the request models.
//!
//! Each function has the shape `validator` expects from
//! `#[validate(custom(function = ...))]`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

/// Two ASCII digits, used for expiry months and years
pub static TWO_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}$").expect("static regex is valid"));

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Luhn checksum over a digits-only card number
pub fn validate_card_number(number: &str) -> Result<(), ValidationError> {
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error("card_number", "Card number must contain only digits"));
    }

    let sum: u32 = number
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let mut n = u32::from(b - b'0');
            if i % 2 == 1 {
                n *= 2;
                if n > 9 {
                    n -= 9;
                }
            }
            n
        })
        .sum();

    if sum % 10 != 0 {
        return Err(error("card_number", "Invalid card number"));
    }
    Ok(())
}

/// Two digits between 01 and 12
pub fn validate_expiry_month(month: &str) -> Result<(), ValidationError> {
    if !TWO_DIGITS.is_match(month) {
        return Err(error("expiry_month", "Expiry month must be 2 digits"));
    }
    match month.parse::<u8>() {
        Ok(1..=12) => Ok(()),
        _ => Err(error("expiry_month", "Expiry month must be between 01 and 12")),
    }
}

/// `YYYY-MM-DD`
pub fn validate_birth_date(date: &str) -> Result<(), ValidationError> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| error("birth_date", "birthDate must be in YYYY-MM-DD format"))
}

/// Webhook callbacks can only be delivered with GET or POST
pub fn validate_http_method(method: &str) -> Result<(), ValidationError> {
    match method {
        "GET" | "POST" => Ok(()),
        _ => Err(error("method", "method must be GET or POST")),
    }
}

/// Identifiers sent in URL paths must not be blank
pub fn validate_identifier(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("identifier", "Identifier must not be empty"));
    }
    Ok(())
}
