//! Cart change notifications.
//!
//! The store announces every cart mutation to registered [`CartListener`]s.
//! The page registers one that refreshes the badge and, in the browser, one
//! that re-dispatches the change as a DOM `CustomEvent` for other scripts.

use std::cell::RefCell;
use std::rc::Rc;

/// Payload of a cart change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartUpdated {
    /// Total quantity in the cart after the change.
    pub count: u64,
}

/// Observer of cart changes.
pub trait CartListener {
    fn cart_updated(&self, event: &CartUpdated);
}

impl<F: Fn(&CartUpdated)> CartListener for F {
    fn cart_updated(&self, event: &CartUpdated) {
        self(event);
    }
}

/// Named listener registry.
///
/// Registration is idempotent per name: subscribing a name that is already
/// registered replaces the earlier listener instead of adding a second one.
#[derive(Default)]
pub struct Listeners {
    entries: RefCell<Vec<(String, Rc<dyn CartListener>)>>,
}

impl Listeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `name`. Returns `true` if the name was new.
    pub fn subscribe(&self, name: &str, listener: Rc<dyn CartListener>) -> bool {
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = listener;
            return false;
        }
        entries.push((name.to_string(), listener));
        true
    }

    /// Remove the listener registered under `name`. Returns `true` if found.
    pub fn unsubscribe(&self, name: &str) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(n, _)| n != name);
        entries.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Notify every listener in registration order.
    ///
    /// Listeners may subscribe or unsubscribe while being notified; changes
    /// take effect from the next notification.
    pub fn notify(&self, event: &CartUpdated) {
        let snapshot: Vec<_> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener.cart_updated(event);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .entries
            .borrow()
            .iter()
            .map(|(n, _)| n.clone())
            .collect();
        f.debug_struct("Listeners").field("names", &names).finish()
    }
}
