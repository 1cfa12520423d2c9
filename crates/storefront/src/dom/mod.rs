//! The slice of the DOM the cart UI touches.
//!
//! UI code is written against these traits rather than `web_sys` directly so
//! it runs unchanged against [`MemoryDocument`], a `scraper`-parsed page,
//! in tests. The browser implementation lives in `browser` and is only
//! compiled for `wasm32`.

#[cfg(target_arch = "wasm32")]
mod browser;
mod memory;

use std::time::Duration;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserDocument, BrowserElement, TimeoutScheduler};
pub use memory::{ManualScheduler, MemoryDocument, MemoryElement};

/// Stable identity of an element within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(pub u64);

/// Something elements can be searched under: a document or an element.
pub trait ParentNode {
    type Element: DomElement;

    /// First matching descendant in document order.
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;

    /// All matching descendants in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;
}

/// An element handle.
pub trait DomElement: ParentNode<Element = Self> + Clone + 'static {
    /// Identity used to bind each element at most once.
    fn key(&self) -> ElementKey;

    /// Attribute value, `None` if absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, selector: &str) -> Option<Self>;

    /// Concatenated text of the element and its descendants.
    fn text_content(&self) -> String;

    /// Replace the element's children with a text node.
    fn set_text_content(&self, text: &str);

    /// Attach a click handler. Handlers stay attached for the page lifetime.
    fn on_click(&self, handler: Box<dyn FnMut()>);
}

/// Runs deferred work after a delay (`setTimeout`).
pub trait Scheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}
