//! Parsing of money amounts and due dates from request payloads

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::core::error::{LedgerError, SchoolResult, ValidationError};

/// Amounts carry at most this many decimal places
pub const MONEY_SCALE: u32 = 2;

/// Largest single invoice or payment amount accepted (one billion)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Parse a positive money amount sent as a JSON number or numeric string.
///
/// Trailing garbage (`"12abc"`) is rejected, as are zero, negatives,
/// sub-cent precision and anything above [`MAX_AMOUNT`].
pub fn parse_amount(field: &str, value: &Value) -> SchoolResult<Decimal> {
    let raw = match value {
        Value::Null => return Err(ValidationError::MissingFields(vec![field.to_string()]).into()),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.trim().is_empty() => {
            return Err(ValidationError::MissingFields(vec![field.to_string()]).into());
        }
        Value::String(s) => s.trim().to_string(),
        _ => return Err(ValidationError::field(field, "must be a number").into()),
    };

    let amount = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| {
            ValidationError::field(
                field,
                format!("invalid amount '{}', must be a positive number", raw),
            )
        })?
        .normalize();

    if amount <= Decimal::ZERO {
        return Err(ValidationError::field(
            field,
            format!("invalid amount '{}', must be a positive number", raw),
        )
        .into());
    }
    if amount.scale() > MONEY_SCALE {
        return Err(ValidationError::field(
            field,
            format!(
                "amount '{}' has sub-cent precision, at most {} decimal places are allowed",
                raw, MONEY_SCALE
            ),
        )
        .into());
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::field(
            field,
            format!("amount '{}' exceeds the maximum of {}", raw, MAX_AMOUNT),
        )
        .into());
    }
    Ok(amount)
}

/// Sum amounts, failing instead of panicking when the total overflows
pub fn checked_total<I>(amounts: I) -> SchoolResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| LedgerError::AmountOverflow.into())
}

/// Parse a due date given as `YYYY-MM-DD` or an RFC 3339 timestamp.
/// Timestamps are reduced to their UTC calendar date.
pub fn parse_due_date(field: &str, value: &Value) -> SchoolResult<NaiveDate> {
    let raw = match value {
        Value::Null => return Err(ValidationError::MissingFields(vec![field.to_string()]).into()),
        Value::String(s) if s.trim().is_empty() => {
            return Err(ValidationError::MissingFields(vec![field.to_string()]).into());
        }
        Value::String(s) => s.trim(),
        _ => return Err(ValidationError::field(field, "must be a date string").into()),
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| {
            ValidationError::field(
                field,
                format!("invalid date '{}', use YYYY-MM-DD", raw),
            )
            .into()
        })
}
