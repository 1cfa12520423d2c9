//! Cart line items and the merge rules that keep one line per product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::{ProductId, ProductIdError};
use super::lenient;

/// Errors that can occur when reading a [`CartItemInput`] from loose JSON.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The value is not a JSON object.
    #[error("cart item must be an object")]
    NotAnObject,
    /// The item has no usable `id`.
    #[error("cart item has no id: {0}")]
    MissingId(#[from] ProductIdError),
}

/// One product line in the cart with its aggregated quantity.
///
/// Serialized with the field names page scripts read (`id`, `name`, `price`,
/// `img`, `qty`). Deserialization is lenient: records written by older
/// scripts may lack `name`/`img`/`qty` or carry prices as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub name: String,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "lenient::deserialize_price"
    )]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient::deserialize_text")]
    pub img: String,
    #[serde(
        default = "lenient::default_qty",
        deserialize_with = "lenient::deserialize_qty"
    )]
    pub qty: u32,
}

impl CartItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// A product descriptor on its way into the cart.
///
/// Only the id is required. When the id is already in the cart only `qty`
/// matters; otherwise the missing fields take their defaults (empty name and
/// image, zero price, quantity one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemInput {
    pub id: ProductId,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub img: Option<String>,
    pub qty: Option<u32>,
}

impl CartItemInput {
    /// An input carrying only an id.
    #[must_use]
    pub const fn new(id: ProductId) -> Self {
        Self {
            id,
            name: None,
            price: None,
            img: None,
            qty: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn img(mut self, img: impl Into<String>) -> Self {
        self.img = Some(img.into());
        self
    }

    #[must_use]
    pub const fn qty(mut self, qty: u32) -> Self {
        self.qty = Some(qty);
        self
    }

    /// Read an input from a loosely typed JSON object.
    ///
    /// Unknown fields are ignored. `price` and `qty` are coerced the same way
    /// stored cart records are.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::NotAnObject`] for non-objects and
    /// [`ItemError::MissingId`] when `id` is absent, empty or not a
    /// string/number.
    pub fn from_json(value: &Value) -> Result<Self, ItemError> {
        let object = value.as_object().ok_or(ItemError::NotAnObject)?;
        let id = ProductId::from_json(object.get("id").unwrap_or(&Value::Null))?;

        Ok(Self {
            id,
            name: lenient::text(object.get("name")),
            price: object.get("price").map(lenient::price),
            img: lenient::text(object.get("img")),
            qty: object.get("qty").map(lenient::qty),
        })
    }

    /// The quantity this input adds, defaulting to one.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.qty.filter(|q| *q >= 1).unwrap_or(1)
    }

    fn into_item(self) -> CartItem {
        let qty = self.quantity();
        CartItem {
            id: self.id,
            name: self.name.unwrap_or_default(),
            price: self
                .price
                .filter(|p| !p.is_sign_negative())
                .unwrap_or(Decimal::ZERO),
            img: self.img.unwrap_or_default(),
            qty,
        }
    }
}

impl From<CartItem> for CartItemInput {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            name: Some(item.name),
            price: Some(item.price),
            img: Some(item.img),
            qty: Some(item.qty),
        }
    }
}

/// The shopper's cart: line items in insertion order, one per product id.
///
/// Serialized as a bare JSON array so the stored value stays readable by
/// other page scripts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored items, folding duplicate ids together.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item.into());
        }
        cart
    }

    /// Rebuild a cart from stored records one line at a time.
    ///
    /// A record that does not decode as a [`CartItem`] is left out and its
    /// error returned alongside, so one bad line never empties the cart.
    /// Duplicate ids are folded.
    #[must_use]
    pub fn from_records(records: Vec<Value>) -> (Self, Vec<serde_json::Error>) {
        let mut cart = Self::new();
        let mut rejected = Vec::new();
        for record in records {
            match serde_json::from_value::<CartItem>(record) {
                Ok(item) => {
                    cart.add(item.into());
                }
                Err(e) => rejected.push(e),
            }
        }
        (cart, rejected)
    }

    /// Add an item: merge into the existing line for its id, or append.
    ///
    /// Returns the resulting quantity of that line.
    pub fn add(&mut self, input: CartItemInput) -> u32 {
        let added = input.quantity();
        if let Some(line) = self.items.iter_mut().find(|line| line.id == input.id) {
            line.qty = line.qty.saturating_add(added);
            return line.qty;
        }
        self.items.push(input.into_item());
        added
    }

    /// Look up the line for a product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.qty)).sum()
    }

    /// Sum of price times quantity across all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
