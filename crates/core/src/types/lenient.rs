//! Loose coercions for values written by page scripts.
//!
//! Cart records and product payloads come from hand-written HTML and from
//! other scripts sharing the same storage, so numbers may arrive as strings,
//! be missing, or be garbage. Every ingestion path funnels through these.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce a JSON value to a non-negative price.
///
/// Numbers are taken as-is, strings are trimmed and parsed (empty is zero).
/// Anything non-numeric, non-finite or negative becomes zero.
pub fn price(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_u64().map(Decimal::from))
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => price_from_str(s),
        _ => None,
    };

    parsed
        .filter(|d| !d.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

fn price_from_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(trimmed).ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(|f| Decimal::try_from(f).ok())
    })
}

/// Coerce a JSON value to a line quantity of at least one.
///
/// Missing, zero, negative and non-numeric quantities count as one.
/// Fractional quantities are truncated.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn qty(value: &Value) -> u32 {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 1.0).map(|f| f.trunc() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    parsed
        .filter(|q| *q >= 1)
        .map_or(1, |q| u32::try_from(q).unwrap_or(u32::MAX))
}

/// Coerce an optional JSON value to a string, ignoring non-strings.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn deserialize_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    Ok(price(&Value::deserialize(deserializer)?))
}

pub fn deserialize_qty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(qty(&Value::deserialize(deserializer)?))
}

pub fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text(Some(&Value::deserialize(deserializer)?)).unwrap_or_default())
}

pub const fn default_qty() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_numbers() {
        assert_eq!(price(&json!(150_000)), Decimal::from(150_000));
        assert_eq!(price(&json!(19.5)), Decimal::new(195, 1));
    }

    #[test]
    fn test_price_strings() {
        assert_eq!(price(&json!(" 250000 ")), Decimal::from(250_000));
        assert_eq!(price(&json!("")), Decimal::ZERO);
        assert_eq!(price(&json!("1e3")), Decimal::from(1000));
    }

    #[test]
    fn test_price_garbage_is_zero() {
        assert_eq!(price(&json!("abc")), Decimal::ZERO);
        assert_eq!(price(&json!(null)), Decimal::ZERO);
        assert_eq!(price(&json!([1])), Decimal::ZERO);
        assert_eq!(price(&json!(-5)), Decimal::ZERO);
    }

    #[test]
    fn test_qty_defaults_to_one() {
        assert_eq!(qty(&json!(null)), 1);
        assert_eq!(qty(&json!(0)), 1);
        assert_eq!(qty(&json!(-3)), 1);
        assert_eq!(qty(&json!("x")), 1);
    }

    #[test]
    fn test_qty_values() {
        assert_eq!(qty(&json!(3)), 3);
        assert_eq!(qty(&json!("4")), 4);
        assert_eq!(qty(&json!(2.7)), 2);
        assert_eq!(qty(&json!(u64::MAX)), u32::MAX);
    }

    #[test]
    fn test_text() {
        assert_eq!(text(Some(&json!("a.jpg"))), Some("a.jpg".to_string()));
        assert_eq!(text(Some(&json!(5))), Some("5".to_string()));
        assert_eq!(text(Some(&json!(null))), None);
        assert_eq!(text(None), None);
    }
}
