//! Page UI: year display, cart badge, and add-to-cart buttons.
//!
//! All updates are no-ops when the target element is missing from the page.

pub mod binding;
pub mod extract;

use chrono::Datelike;

use crate::dom::{DomElement, ParentNode};
use crate::events::{CartListener, CartUpdated};

pub use binding::AddToCartBinder;
pub use extract::{extract_product, normalize};

/// The current year in the visitor's local time.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Write `year` into the year element. Returns whether it was found.
pub fn update_year<P: ParentNode>(root: &P, selector: &str, year: i32) -> bool {
    root.query_selector(selector)
        .map(|el| el.set_text_content(&year.to_string()))
        .is_some()
}

/// Write `count` into the cart badge. Returns whether it was found.
pub fn update_cart_badge<P: ParentNode>(root: &P, selector: &str, count: u64) -> bool {
    root.query_selector(selector)
        .map(|el| el.set_text_content(&count.to_string()))
        .is_some()
}

/// Keeps the cart badge in sync with the store.
#[derive(Debug, Clone)]
pub struct BadgeListener<P> {
    root: P,
    selector: String,
}

impl<P: ParentNode> BadgeListener<P> {
    pub fn new(root: P, selector: impl Into<String>) -> Self {
        Self {
            root,
            selector: selector.into(),
        }
    }
}

impl<P: ParentNode> CartListener for BadgeListener<P> {
    fn cart_updated(&self, event: &CartUpdated) {
        update_cart_badge(&self.root, &self.selector, event.count);
    }
}
