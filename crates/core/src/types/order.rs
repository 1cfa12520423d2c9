//! Completed order records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A completed order as handed over by the checkout page.
///
/// The cart store does not own an order schema; whatever object the page
/// records is stored and returned verbatim. Orders are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Value);

impl Order {
    /// Wrap a JSON value as an order.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Look up a top-level field of the order object.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Order {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_is_stored_verbatim() {
        let raw = json!({"code": "DH001", "total": 330_000, "items": [{"id": "sku1"}]});
        let order = Order::new(raw.clone());

        assert_eq!(serde_json::to_value(&order).unwrap(), raw);
        assert_eq!(order.field("code"), Some(&json!("DH001")));
        assert_eq!(order.field("missing"), None);
    }
}
