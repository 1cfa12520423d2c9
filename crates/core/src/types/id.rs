//! Product identifier type.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input is empty.
    #[error("product id cannot be empty")]
    Empty,
    /// The input is neither a string nor a number.
    #[error("product id must be a string or a number")]
    WrongType,
}

/// The identity of a cart line.
///
/// Two cart items with the same `ProductId` are the same line; adding one
/// merges quantities instead of appending.
///
/// Ids are compared verbatim: `"sku1 "` and `"sku1"` are different lines,
/// as other page scripts reading the stored cart would see them. The only
/// rejected string is the empty one.
///
/// Numeric ids found in embedded product JSON (`{"id": 12}`) are accepted and
/// stored in their decimal string form.
///
/// ## Examples
///
/// ```
/// use oplung_core::ProductId;
///
/// assert!(ProductId::parse("sku1").is_ok());
/// assert_eq!(ProductId::parse(" sku1 ").unwrap().as_str(), " sku1 ");
///
/// assert!(ProductId::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse a `ProductId` from a string, keeping it as given.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::Empty`] if the input is empty.
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        if s.is_empty() {
            return Err(ProductIdError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Parse a `ProductId` from a loosely typed JSON value.
    ///
    /// Strings are parsed as with [`Self::parse`]; numbers use their JSON
    /// text. A zero number is rejected like an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`ProductIdError::WrongType`] for booleans, arrays, objects and
    /// `null`, and the [`Self::parse`] errors otherwise.
    pub fn from_json(value: &Value) -> Result<Self, ProductIdError> {
        match value {
            Value::String(s) => Self::parse(s),
            Value::Number(n) if n.as_f64() == Some(0.0) => Err(ProductIdError::Empty),
            Value::Number(n) => Self::parse(&n.to_string()),
            _ => Err(ProductIdError::WrongType),
        }
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ProductId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProductId {
    type Err = ProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_ids() {
        assert!(ProductId::parse("sku1").is_ok());
        assert!(ProductId::parse("ao-thun-trang").is_ok());
        assert!(ProductId::parse("42").is_ok());
    }

    #[test]
    fn test_parse_keeps_input_verbatim() {
        let padded = ProductId::parse("sku1 ").unwrap();
        assert_eq!(padded.as_str(), "sku1 ");
        assert_ne!(padded, ProductId::parse("sku1").unwrap());
        assert_eq!(ProductId::parse("  ").unwrap().as_str(), "  ");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ProductId::parse(""), Err(ProductIdError::Empty));
    }

    #[test]
    fn test_parse_long_ids() {
        let long = "a".repeat(300);
        assert_eq!(ProductId::parse(&long).unwrap().as_str().len(), 300);
    }

    #[test]
    fn test_from_json_number() {
        let id = ProductId::from_json(&json!(12)).unwrap();
        assert_eq!(id.as_str(), "12");
        assert_eq!(
            ProductId::from_json(&json!(0)),
            Err(ProductIdError::Empty)
        );
    }

    #[test]
    fn test_from_json_wrong_type() {
        assert_eq!(
            ProductId::from_json(&json!(true)),
            Err(ProductIdError::WrongType)
        );
        assert_eq!(
            ProductId::from_json(&Value::Null),
            Err(ProductIdError::WrongType)
        );
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::parse("sku1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"sku1\"");

        let parsed: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.as_str(), "7");
    }
}
