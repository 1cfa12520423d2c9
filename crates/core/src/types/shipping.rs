//! Flat-rate shipping with a free-shipping threshold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shipping charged on an order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Subtotals at or above this ship free.
    pub free_threshold: Decimal,
    /// Fee charged below the threshold.
    pub fee: Decimal,
}

impl ShippingPolicy {
    /// Free shipping from 300.000₫.
    pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(300_000, 0, 0, false, 0);
    /// 30.000₫ below the threshold.
    pub const DEFAULT_FEE: Decimal = Decimal::from_parts(30_000, 0, 0, false, 0);

    #[must_use]
    pub const fn new(free_threshold: Decimal, fee: Decimal) -> Self {
        Self { free_threshold, fee }
    }

    /// Shipping fee for a subtotal. Empty carts ship nothing and pay nothing.
    #[must_use]
    pub fn fee_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal <= Decimal::ZERO || subtotal >= self.free_threshold {
            Decimal::ZERO
        } else {
            self.fee
        }
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn total_for(&self, subtotal: Decimal) -> Decimal {
        subtotal + self.fee_for(subtotal)
    }
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD, Self::DEFAULT_FEE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.free_threshold, Decimal::from(300_000));
        assert_eq!(policy.fee, Decimal::from(30_000));
    }

    #[test]
    fn test_fee_below_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(Decimal::from(150_000)), Decimal::from(30_000));
        assert_eq!(policy.total_for(Decimal::from(150_000)), Decimal::from(180_000));
    }

    #[test]
    fn test_free_at_threshold() {
        let policy = ShippingPolicy::default();
        assert_eq!(policy.fee_for(Decimal::from(300_000)), Decimal::ZERO);
        assert_eq!(policy.fee_for(Decimal::from(900_000)), Decimal::ZERO);
    }

    #[test]
    fn test_empty_cart_has_no_fee() {
        assert_eq!(ShippingPolicy::default().fee_for(Decimal::ZERO), Decimal::ZERO);
    }
}
