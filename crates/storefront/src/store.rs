//! Cart and order operations over persistent storage.
//!
//! Every operation reads the full record, mutates it, and writes it back.
//! There is no locking: the page runs each handler to completion on one
//! thread, so read-modify-write cycles never interleave.

use std::rc::Rc;

use oplung_core::{Cart, CartItemInput, Order};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::events::{CartListener, CartUpdated, Listeners};
use crate::storage::{JsonStore, KeyValueStorage, StorageError};

/// The cart store: cart and orders records plus change listeners.
pub struct CartStore<S> {
    storage: JsonStore<S>,
    cart_key: String,
    orders_key: String,
    listeners: Listeners,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create a store over `backend`, checking storage availability once.
    pub fn new(backend: S, cart_key: impl Into<String>, orders_key: impl Into<String>) -> Self {
        Self {
            storage: JsonStore::new(backend),
            cart_key: cart_key.into(),
            orders_key: orders_key.into(),
            listeners: Listeners::new(),
        }
    }

    /// Whether cart changes will persist.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.storage.is_available()
    }

    /// The storage wrapper.
    pub const fn storage(&self) -> &JsonStore<S> {
        &self.storage
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// The stored cart, or an empty one.
    ///
    /// Lines are decoded one by one; an unreadable line is skipped and the
    /// rest of the cart kept.
    #[must_use]
    pub fn get_cart(&self) -> Cart {
        let records: Vec<Value> = self.storage.read(&self.cart_key, Vec::new());
        let (cart, rejected) = Cart::from_records(records);
        for error in &rejected {
            warn!(key = %self.cart_key, %error, "Skipping unreadable cart line");
        }
        cart
    }

    /// Replace the stored cart and notify listeners.
    pub fn set_cart(&self, cart: &Cart) {
        self.persist(&self.cart_key, cart);
        self.notify(cart.count());
    }

    /// Replace the stored cart from a page-supplied JSON array.
    ///
    /// Entries without a usable id are rejected as a whole; duplicate ids are
    /// merged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Json` if `items` is not an array of cart records.
    pub fn set_cart_json(&self, items: Value) -> Result<()> {
        let items = serde_json::from_value(items)?;
        self.set_cart(&Cart::from_items(items));
        Ok(())
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        self.set_cart(&Cart::new());
    }

    /// Total quantity across all cart lines.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.get_cart().count()
    }

    /// Add an item, merging quantities with an existing line of the same id.
    ///
    /// Persists the whole cart and notifies listeners. Returns the new total
    /// count.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub fn add_to_cart(&self, item: CartItemInput) -> u64 {
        let mut cart = self.get_cart();
        let line_qty = cart.add(item);
        let count = cart.count();

        self.persist(&self.cart_key, &cart);
        debug!(line_qty, count, "Added to cart");
        self.notify(count);
        count
    }

    /// Add a page-supplied item object.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidItem` if the item is not an object or has
    /// no non-empty id; the cart is left unchanged.
    pub fn add_to_cart_json(&self, item: &Value) -> Result<u64> {
        let input = CartItemInput::from_json(item)?;
        Ok(self.add_to_cart(input))
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// All recorded orders, oldest first.
    #[must_use]
    pub fn get_orders(&self) -> Vec<Order> {
        self.read_orders().unwrap_or_default()
    }

    /// Append an order.
    ///
    /// If the orders record holds valid JSON that is not a list, it belongs
    /// to some other script: the order is dropped and the record left as is.
    #[instrument(skip(self, order))]
    pub fn add_order(&self, order: Order) {
        let Some(mut orders) = self.read_orders() else {
            warn!(key = %self.orders_key, "Orders record is not a list, order not recorded");
            return;
        };
        orders.push(order);
        self.persist(&self.orders_key, &orders);
        debug!(total = orders.len(), "Recorded order");
    }

    /// The stored orders; `None` when the record is something other than a
    /// list. Absent or unparseable records read as empty.
    fn read_orders(&self) -> Option<Vec<Order>> {
        match self.storage.read(&self.orders_key, Value::Null) {
            Value::Null => Some(Vec::new()),
            Value::Array(orders) => Some(orders.into_iter().map(Order::from).collect()),
            _ => None,
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Register a change listener under `name`, replacing any previous one.
    pub fn subscribe(&self, name: &str, listener: Rc<dyn CartListener>) -> bool {
        self.listeners.subscribe(name, listener)
    }

    /// Remove the listener registered under `name`.
    pub fn unsubscribe(&self, name: &str) -> bool {
        self.listeners.unsubscribe(name)
    }

    fn notify(&self, count: u64) {
        self.listeners.notify(&CartUpdated { count });
    }

    /// Write a record, dropping the write if storage refuses it.
    fn persist<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        match self.storage.write(key, value) {
            Ok(()) => {}
            Err(StorageError::Unavailable) => debug!(key, "Storage unavailable, write skipped"),
            Err(e) => warn!(key, error = %e, "Failed to persist"),
        }
    }
}

impl<S: KeyValueStorage> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart_key", &self.cart_key)
            .field("orders_key", &self.orders_key)
            .field("available", &self.storage.is_available())
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}
