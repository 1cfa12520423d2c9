//! Type-safe price representation using decimal arithmetic.
//!
//! Formatting follows the conventions the browser applies for each
//! currency's locale, so server-rendered and script-rendered prices agree:
//!
//! ```
//! use oplung_core::{CurrencyCode, Price};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::from(1_250_000), CurrencyCode::VND);
//! assert_eq!(price.to_string(), "1.250.000₫");
//! ```

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (dong, dollars).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in Vietnamese dong.
    #[must_use]
    pub const fn vnd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::VND)
    }

    /// Format for display (e.g., "150.000₫", "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        self.currency_code.format(self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    VND,
    USD,
}

impl CurrencyCode {
    /// Currency symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::VND => "₫",
            Self::USD => "$",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::VND => "VND",
            Self::USD => "USD",
        }
    }

    /// Digit grouping separator of the currency's home locale.
    #[must_use]
    pub const fn group_separator(self) -> char {
        match self {
            Self::VND => '.',
            Self::USD => ',',
        }
    }

    /// Decimal separator of the currency's home locale.
    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Self::VND => ',',
            Self::USD => '.',
        }
    }

    /// Minimum and maximum fraction digits shown.
    ///
    /// Dong amounts are plain locale numbers (no forced decimals, up to
    /// three shown); dollar amounts always show cents.
    #[must_use]
    pub const fn fraction_digits(self) -> (u32, u32) {
        match self {
            Self::VND => (0, 3),
            Self::USD => (2, 2),
        }
    }

    const fn symbol_is_prefix(self) -> bool {
        matches!(self, Self::USD)
    }

    /// Format an amount with this currency's grouping and symbol.
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let (min_frac, max_frac) = self.fraction_digits();
        let rounded = amount.round_dp_with_strategy(max_frac, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();

        let fixed = format!("{:.prec$}", rounded.abs(), prec = max_frac as usize);
        let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut frac = frac_digits.to_string();
        while frac.len() > min_frac as usize && frac.ends_with('0') {
            frac.pop();
        }

        let mut number = group_digits(int_digits, self.group_separator());
        if !frac.is_empty() {
            number.push(self.decimal_separator());
            number.push_str(&frac);
        }

        let sign = if negative { "-" } else { "" };
        if self.symbol_is_prefix() {
            format!("{sign}{}{number}", self.symbol())
        } else {
            format!("{sign}{number}{}", self.symbol())
        }
    }
}

/// Insert `separator` between every group of three integer digits.
fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vnd_grouping() {
        assert_eq!(CurrencyCode::VND.format(Decimal::ZERO), "0₫");
        assert_eq!(CurrencyCode::VND.format(Decimal::from(999)), "999₫");
        assert_eq!(CurrencyCode::VND.format(Decimal::from(30_000)), "30.000₫");
        assert_eq!(
            CurrencyCode::VND.format(Decimal::from(1_234_567)),
            "1.234.567₫"
        );
    }

    #[test]
    fn test_vnd_fraction_digits() {
        assert_eq!(CurrencyCode::VND.format(Decimal::new(12345, 1)), "1.234,5₫");
        assert_eq!(CurrencyCode::VND.format(Decimal::new(100_005, 4)), "10,001₫");
        assert_eq!(CurrencyCode::VND.format(Decimal::new(1500, 2)), "15₫");
    }

    #[test]
    fn test_usd_format() {
        assert_eq!(CurrencyCode::USD.format(Decimal::new(1999, 2)), "$19.99");
        assert_eq!(CurrencyCode::USD.format(Decimal::from(1200)), "$1,200.00");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(CurrencyCode::VND.format(Decimal::from(-30_000)), "-30.000₫");
    }

    #[test]
    fn test_price_display() {
        let price = Price::vnd(Decimal::from(150_000));
        assert_eq!(price.to_string(), "150.000₫");
        assert_eq!(price.display(), "150.000₫");
    }
}
