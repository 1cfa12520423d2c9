//! Cart store configuration.
//!
//! Values are read from a [`ConfigSource`]: process environment variables on
//! native hosts ([`EnvSource`], `OPLUNG_` prefix), or `data-*` attributes on
//! the page's `<script id="store-config">` element in the browser. Every
//! setting has a default, so an empty source yields a working store.
//!
//! # Settings
//!
//! - `CART_KEY` - Storage key for the cart (default: `cart`)
//! - `ORDERS_KEY` - Storage key for orders (default: `orders`)
//! - `SHIP_THRESHOLD` - Free-shipping subtotal (default: 300000)
//! - `SHIP_FEE` - Shipping fee below the threshold (default: 30000)
//! - `FEEDBACK_LABEL` - Button text shown after adding (default: `Đã thêm ✓`)
//! - `FEEDBACK_MS` - How long the feedback label stays (default: 900)
//! - `LOG_FILTER` - `tracing` filter directive (default: `info`)

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use oplung_core::ShippingPolicy;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::dom::DomElement;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid setting {0}: {1}")]
    InvalidValue(String, String),
    #[error("Storage keys must differ (both are {0:?})")]
    DuplicateKey(String),
}

/// A lookup of raw setting values by name.
pub trait ConfigSource {
    /// The raw value for `key` (e.g. `CART_KEY`), if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Process environment, with a name prefix.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new("OPLUNG_")
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{key}", self.prefix)).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// `data-*` attributes of a page element: `CART_KEY` reads `data-cart-key`.
#[derive(Debug, Clone)]
pub struct AttributeSource<E>(pub E);

impl<E: DomElement> ConfigSource for AttributeSource<E> {
    fn get(&self, key: &str) -> Option<String> {
        let name = format!("data-{}", key.to_ascii_lowercase().replace('_', "-"));
        self.0.attribute(&name)
    }
}

/// Selectors and attribute names of the server-rendered markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomContract {
    /// Add-to-cart controls.
    pub trigger: String,
    /// Attribute carrying an embedded JSON product on a trigger.
    pub payload_attribute: String,
    /// Product card container enclosing a trigger.
    pub card: String,
    /// Title element inside a card.
    pub card_title: String,
    /// Image inside a card.
    pub card_image: String,
    /// Element showing the current year.
    pub year: String,
    /// Cart count badge.
    pub badge: String,
    /// Name of the DOM event dispatched on cart changes.
    pub updated_event: String,
}

impl Default for DomContract {
    fn default() -> Self {
        Self {
            trigger: "[data-add-to-cart]".to_string(),
            payload_attribute: "data-product".to_string(),
            card: ".product-card".to_string(),
            card_title: ".product-card__title".to_string(),
            card_image: "img".to_string(),
            year: "#year".to_string(),
            badge: "#cart-count".to_string(),
            updated_event: "cart:updated".to_string(),
        }
    }
}

/// Transient label swap on a trigger after a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub label: String,
    pub duration: Duration,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            label: "Đã thêm ✓".to_string(),
            duration: Duration::from_millis(900),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage key of the cart record
    pub cart_key: String,
    /// Storage key of the orders record
    pub orders_key: String,
    /// Free-shipping threshold and fee
    pub shipping: ShippingPolicy,
    /// Add-to-cart button feedback
    pub feedback: Feedback,
    /// Markup the UI binds to
    pub dom: DomContract,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cart_key: "cart".to_string(),
            orders_key: "orders".to_string(),
            shipping: ShippingPolicy::default(),
            feedback: Feedback::default(),
            dom: DomContract::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from the process environment (`OPLUNG_*`).
    ///
    /// # Errors
    ///
    /// See [`Self::from_source`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&EnvSource::default())
    }

    /// Load configuration from a source, defaulting unset values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value does not parse, a storage key is
    /// blank, the two storage keys collide, an amount is negative, or the
    /// feedback duration is zero.
    pub fn from_source(source: &impl ConfigSource) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cart_key = get_key(source, "CART_KEY", &defaults.cart_key)?;
        let orders_key = get_key(source, "ORDERS_KEY", &defaults.orders_key)?;
        if cart_key == orders_key {
            return Err(ConfigError::DuplicateKey(cart_key));
        }

        let shipping = ShippingPolicy::new(
            get_amount(source, "SHIP_THRESHOLD", defaults.shipping.free_threshold)?,
            get_amount(source, "SHIP_FEE", defaults.shipping.fee)?,
        );

        let label = get_or_default(source, "FEEDBACK_LABEL", &defaults.feedback.label);
        let millis: u64 = get_parsed(source, "FEEDBACK_MS", 900)?;
        if millis == 0 {
            return Err(ConfigError::InvalidValue(
                "FEEDBACK_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            cart_key,
            orders_key,
            shipping,
            feedback: Feedback {
                label,
                duration: Duration::from_millis(millis),
            },
            dom: defaults.dom,
            log_filter: get_or_default(source, "LOG_FILTER", &defaults.log_filter),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a value with a default.
fn get_or_default(source: &impl ConfigSource, key: &str, default: &str) -> String {
    source.get(key).unwrap_or_else(|| default.to_string())
}

/// Get and parse a value with a default.
fn get_parsed<T>(source: &impl ConfigSource, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    source.get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
    })
}

/// Get a storage key, rejecting blank values.
fn get_key(source: &impl ConfigSource, key: &str, default: &str) -> Result<String, ConfigError> {
    let value = get_or_default(source, key, default);
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(value)
}

/// Get a non-negative amount.
fn get_amount(source: &impl ConfigSource, key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    let amount: Decimal = get_parsed(source, key, default)?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(amount)
}
