//! Formatting helpers exposed to page scripts.

use oplung_core::{Price, ShippingPolicy};
use rust_decimal::Decimal;

/// Free-shipping threshold (300.000₫).
pub const SHIP_THRESHOLD: Decimal = ShippingPolicy::DEFAULT_THRESHOLD;

/// Shipping fee below the threshold (30.000₫).
pub const SHIP_FEE: Decimal = ShippingPolicy::DEFAULT_FEE;

/// Format an amount as Vietnamese dong, e.g. `150.000₫`.
///
/// A missing amount formats as zero.
#[must_use]
pub fn fmt_vnd(amount: Option<Decimal>) -> String {
    Price::vnd(amount.unwrap_or_default()).display()
}

/// Look up a query-string parameter.
///
/// `search` is a `location.search` style string; the leading `?` is
/// optional. Values are percent- and `+`-decoded. The first occurrence wins.
#[must_use]
pub fn get_param(name: &str, search: &str) -> Option<String> {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_vnd() {
        assert_eq!(fmt_vnd(Some(Decimal::from(150_000))), "150.000₫");
        assert_eq!(fmt_vnd(Some(SHIP_FEE)), "30.000₫");
        assert_eq!(fmt_vnd(None), "0₫");
    }

    #[test]
    fn test_get_param() {
        assert_eq!(get_param("id", "?id=sku1&q=x").as_deref(), Some("sku1"));
        assert_eq!(get_param("q", "id=sku1&q=%C3%A1o+thun").as_deref(), Some("áo thun"));
        assert_eq!(get_param("missing", "?id=sku1"), None);
        assert_eq!(get_param("id", ""), None);
    }

    #[test]
    fn test_get_param_first_occurrence_wins() {
        assert_eq!(get_param("id", "?id=a&id=b").as_deref(), Some("a"));
    }

    #[test]
    fn test_get_param_empty_value() {
        assert_eq!(get_param("flag", "?flag").as_deref(), Some(""));
    }

    #[test]
    fn test_constants() {
        assert_eq!(SHIP_THRESHOLD, Decimal::from(300_000));
        assert_eq!(SHIP_FEE, Decimal::from(30_000));
    }
}
